use fuzzer_config::{ClientSpec, Config};
use fuzzer_core::{ClientLauncher, CppLauncher, GethLauncher, HeraLauncher, ParityLauncher};

/// Picks the `ClientLauncher` matching a configured client by name (spec
/// §4.D / §9 "one `ClientLauncher` impl per client kind"). Matching is by
/// substring so profile names like `geth-stable` or `parity2` still
/// resolve to their family.
pub fn build_launcher(spec: &ClientSpec) -> Option<Box<dyn ClientLauncher>> {
    let name = spec.name.to_ascii_lowercase();
    if name.contains("geth") {
        Some(Box::new(GethLauncher { name: spec.name.clone() }))
    } else if name.contains("parity") || name.contains("openethereum") {
        Some(Box::new(ParityLauncher { name: spec.name.clone() }))
    } else if name.contains("hera") {
        Some(Box::new(HeraLauncher { name: spec.name.clone() }))
    } else if name.contains("cpp") || name.contains("aleth") {
        Some(Box::new(CppLauncher { name: spec.name.clone() }))
    } else {
        None
    }
}

pub fn build_launchers(config: &Config) -> Vec<Box<dyn ClientLauncher>> {
    config
        .active_clients
        .iter()
        .filter_map(|spec| {
            let launcher = build_launcher(spec);
            if launcher.is_none() {
                tracing::warn!(client = %spec.name, "no client runner known for this name, skipping");
            }
            launcher
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_client_families_by_substring() {
        assert!(build_launcher(&ClientSpec::container("geth", "ethereum/client-go")).is_some());
        assert!(build_launcher(&ClientSpec::container("parity", "parity/parity")).is_some());
        assert!(build_launcher(&ClientSpec::native("cpp", "/usr/bin/testeth")).is_some());
        assert!(build_launcher(&ClientSpec::native("unknown-client", "/bin/true")).is_none());
    }
}
