use crate::model::TestCase;

/// Builds the exec argv for one client kind (spec §4.D, §9 "replacing
/// per-client startup switch-on-string"). One implementation per
/// client; the scheduler holds a `Vec<Box<dyn ClientLauncher>>`.
pub trait ClientLauncher: Send + Sync {
    fn client_name(&self) -> &str;
    fn build_argv(&self, test: &TestCase) -> Vec<String>;
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone)]
pub struct GethLauncher {
    pub name: String,
}

impl ClientLauncher for GethLauncher {
    fn client_name(&self) -> &str {
        &self.name
    }

    fn build_argv(&self, test: &TestCase) -> Vec<String> {
        let mut argv = strings(&["evm", "--json", "--nomemory", "statetest"]);
        argv.push(format!("/testfiles/{}", test.filename));
        argv
    }
}

#[derive(Debug, Clone)]
pub struct ParityLauncher {
    pub name: String,
}

impl ClientLauncher for ParityLauncher {
    fn client_name(&self) -> &str {
        &self.name
    }

    fn build_argv(&self, test: &TestCase) -> Vec<String> {
        let mut argv = strings(&["/parity-evm", "state-test", "--std-json"]);
        argv.push(format!("/testfiles/{}", test.filename));
        argv
    }
}

#[derive(Debug, Clone)]
pub struct CppLauncher {
    pub name: String,
}

impl ClientLauncher for CppLauncher {
    fn client_name(&self) -> &str {
        &self.name
    }

    fn build_argv(&self, test: &TestCase) -> Vec<String> {
        let mut argv = strings(&["/usr/bin/testeth", "-t", "GeneralStateTests", "--", "--singletest"]);
        argv.push(format!("/testfiles/{}", test.filename));
        argv.push(test.root_key());
        argv.push("--jsontrace".to_string());
        argv.push("{}".to_string());
        argv
    }
}

#[derive(Debug, Clone)]
pub struct HeraLauncher {
    pub name: String,
}

impl ClientLauncher for HeraLauncher {
    fn client_name(&self) -> &str {
        &self.name
    }

    fn build_argv(&self, test: &TestCase) -> Vec<String> {
        let mut argv = strings(&[
            "/build/test/testeth",
            "-t",
            "GeneralStateTests",
            "--",
            "--vm",
            "hera",
            "--evmc",
            "evm2wasm.js=true",
            "--evmc",
            "fallback=false",
            "--singletest",
        ]);
        argv.push(format!("/testfiles/{}", test.filename));
        argv.push(test.root_key());
        argv
    }
}

/// Wraps `argv` in a shell so combined stdout+stderr lands in the
/// mounted tracefile (spec §4.D: some clients emit the canonical trace
/// on stderr; redirecting both avoids the docker exec-stream
/// interleaving problem).
pub fn sh_wrap(argv: &[String], trace_filename: &str) -> Vec<String> {
    let joined = argv.join(" ");
    vec![
        "/bin/sh".to_string(),
        "-c".to_string(),
        format!("{joined} &> /logs/{trace_filename}"),
    ]
}
