use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ini::Ini;

use crate::cli::CliArgs;
use crate::client::ClientSpec;
use crate::error::ConfigError;
use crate::host_tag::host_tag;

/// Codegen engine weight, from the `[codegen] engine.<Name>.enabled` /
/// `.weight` keys (spec §6). Opaque to the core — consumed only by the
/// external `TestFactory`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenEngine {
    pub name: String,
    pub enabled: bool,
    pub weight: u32,
}

/// Fully-resolved configuration: the merge of the INI profile for the
/// current user (or `DEFAULT`) with any CLI overrides, matching the
/// Python `Config.__init__`'s `vars(cmdline_args)`-over-section merge
/// exactly (spec §6, §9).
#[derive(Debug, Clone)]
pub struct Config {
    pub active_clients: Vec<ClientSpec>,
    pub fork_config: String,
    pub artefacts: PathBuf,
    pub tests_path: PathBuf,
    pub host_tag: String,
    pub force_save: bool,
    pub enable_reporting: bool,
    pub docker_force_update_image: Vec<String>,
    pub dry_run: bool,
    pub benchmark: bool,
    pub codegen_engines: Vec<CodegenEngine>,
    pub statetest_params: HashMap<String, String>,
}

impl Config {
    pub fn testfiles_path(&self) -> PathBuf {
        self.tests_path.join("testfiles")
    }

    pub fn logfiles_path(&self) -> PathBuf {
        self.tests_path.join("logs")
    }

    pub fn client_names(&self) -> Vec<String> {
        self.active_clients.iter().map(|c| c.name.clone()).collect()
    }

    /// Loads and merges config the way spec §6/§9 describes: parse the INI
    /// file, pick the section named after the current OS user (falling
    /// back to `DEFAULT`), then overlay any CLI flags that were actually
    /// set.
    pub fn load(cli: &CliArgs, current_user: &str, pid: u32) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(&cli.configfile).map_err(|e| to_config_error(&cli.configfile, e))?;

        let profile = if ini.section(Some(current_user)).is_some() {
            current_user
        } else {
            tracing::debug!(user = current_user, "no profile section for user, falling back to DEFAULT");
            "DEFAULT"
        };

        let section = ini
            .section(Some(profile))
            .or_else(|| ini.section(None::<String>))
            .ok_or_else(|| ConfigError::MissingKey {
                section: profile.to_string(),
                key: "<section>".to_string(),
            })?;

        let clients_raw = get_required(section, profile, "clients")?;
        let active_clients = parse_clients(&clients_raw, section);

        let fork_config = section.get("fork_config").unwrap_or_default().to_string();
        let artefacts = resolve_path(&get_required(section, profile, "artefacts")?);
        let tests_path = resolve_path(&get_required(section, profile, "tests_path")?);

        let force_save = cli.force_save || get_bool(section, "force_save");
        let enable_reporting = cli.enable_reporting || get_bool(section, "enable_reporting");

        let docker_force_update_image = if !cli.docker_force_update_image.is_empty() {
            cli.docker_force_update_image.clone()
        } else {
            section
                .get("docker_force_update_image")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
                .unwrap_or_default()
        };

        let codegen_engines = ini
            .section(Some("codegen"))
            .map(parse_codegen_engines)
            .unwrap_or_default();

        let statetest_params = ini
            .section(Some("statetest"))
            .map(|s| s.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
            .unwrap_or_default();

        Ok(Config {
            active_clients,
            fork_config,
            artefacts,
            tests_path,
            host_tag: host_tag(current_user, pid),
            force_save,
            enable_reporting,
            docker_force_update_image,
            dry_run: cli.dry_run,
            benchmark: cli.benchmark,
            codegen_engines,
            statetest_params,
        })
    }

    /// Creates the `testfiles/`, `logs/`, and `artefacts/` directories if
    /// they don't already exist (spec §6 layout).
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.artefacts)?;
        std::fs::create_dir_all(self.testfiles_path())?;
        std::fs::create_dir_all(self.logfiles_path())?;
        Ok(())
    }
}

fn to_config_error(path: &Path, err: ini::Error) -> ConfigError {
    match err {
        ini::Error::Io(source) => ConfigError::Read {
            path: path.to_path_buf(),
            source,
        },
        parse => ConfigError::Parse {
            path: path.to_path_buf(),
            source: parse,
        },
    }
}

fn get_required(section: &ini::Properties, profile: &str, key: &str) -> Result<String, ConfigError> {
    section
        .get(key)
        .map(str::to_string)
        .ok_or_else(|| ConfigError::MissingKey {
            section: profile.to_string(),
            key: key.to_string(),
        })
}

fn get_bool(section: &ini::Properties, key: &str) -> bool {
    matches!(
        section.get(key).map(str::trim),
        Some("1") | Some("true") | Some("True") | Some("yes")
    )
}

fn resolve_path(raw: &str) -> PathBuf {
    let expanded = shellexpand_home(raw.trim());
    let path = PathBuf::from(expanded);
    std::fs::canonicalize(&path).unwrap_or(path)
}

/// Expands a leading `~` to `$HOME`, the one piece of `os.path.expanduser`
/// the Python original relies on for `artefacts`/`tests_path`.
fn shellexpand_home(raw: &str) -> String {
    if let Some(rest) = raw.strip_prefix('~') {
        if let Ok(home) = std::env::var("HOME") {
            return format!("{home}{rest}");
        }
    }
    raw.to_string()
}

fn parse_clients(clients_raw: &str, section: &ini::Properties) -> Vec<ClientSpec> {
    clients_raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|name| {
            if let Some(binary) = section.get(format!("{name}.binary")) {
                return Some(ClientSpec::native(name, binary));
            }
            if let Some(image) = section.get(format!("{name}.docker_name")) {
                return Some(ClientSpec::container(name, image));
            }
            None
        })
        .collect()
}

fn parse_codegen_engines(section: &ini::Properties) -> Vec<CodegenEngine> {
    let mut names: Vec<String> = Vec::new();
    for (key, _) in section.iter() {
        if let Some(rest) = key.strip_prefix("engine.") {
            if let Some(name) = rest.strip_suffix(".enabled").or_else(|| rest.strip_suffix(".weight")) {
                if !names.contains(&name.to_string()) {
                    names.push(name.to_string());
                }
            }
        }
    }

    names
        .into_iter()
        .map(|name| {
            let enabled = section
                .get(format!("engine.{name}.enabled"))
                .map(|v| matches!(v.trim(), "1" | "true" | "True" | "yes"))
                .unwrap_or(true);
            let weight = section
                .get(format!("engine.{name}.weight"))
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(50);
            CodegenEngine { name, enabled, weight }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_ini(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn cli_for(configfile: PathBuf) -> CliArgs {
        CliArgs {
            configfile,
            verbosity: "info".to_string(),
            dry_run: false,
            benchmark: false,
            force_save: false,
            enable_reporting: false,
            docker_force_update_image: Vec::new(),
        }
    }

    #[test]
    fn falls_back_to_default_section_when_user_absent() {
        let file = write_ini(
            "[DEFAULT]\nclients = geth,parity\ngeth.docker_name = ethereum/client-go\nparity.docker_name = parity/parity\nartefacts = /tmp/artefacts\ntests_path = /tmp/tests\nfork_config = Constantinople\n",
        );
        let cli = cli_for(file.path().to_path_buf());
        let config = Config::load(&cli, "nonexistent-user", 1234).unwrap();
        assert_eq!(config.client_names(), vec!["geth", "parity"]);
        assert_eq!(config.fork_config, "Constantinople");
    }

    #[test]
    fn cli_force_save_overrides_ini() {
        let file = write_ini(
            "[DEFAULT]\nclients = geth\ngeth.docker_name = ethereum/client-go\nartefacts = /tmp/artefacts\ntests_path = /tmp/tests\nforce_save = false\n",
        );
        let mut cli = cli_for(file.path().to_path_buf());
        cli.force_save = true;
        let config = Config::load(&cli, "nonexistent-user", 1234).unwrap();
        assert!(config.force_save);
    }

    #[test]
    fn native_and_container_clients_are_distinguished() {
        let file = write_ini(
            "[DEFAULT]\nclients = geth,cpp\ngeth.docker_name = ethereum/client-go\ncpp.binary = /usr/bin/testeth\nartefacts = /tmp/artefacts\ntests_path = /tmp/tests\n",
        );
        let cli = cli_for(file.path().to_path_buf());
        let config = Config::load(&cli, "nonexistent-user", 1234).unwrap();
        assert!(config.active_clients[0].is_container());
        assert!(!config.active_clients[1].is_container());
    }

    #[test]
    fn docker_force_update_image_is_a_list() {
        let file = write_ini(
            "[DEFAULT]\nclients = geth\ngeth.docker_name = ethereum/client-go\nartefacts = /tmp/artefacts\ntests_path = /tmp/tests\ndocker_force_update_image = geth, parity\n",
        );
        let cli = cli_for(file.path().to_path_buf());
        let config = Config::load(&cli, "nonexistent-user", 1234).unwrap();
        assert_eq!(config.docker_force_update_image, vec!["geth", "parity"]);
    }

    #[test]
    fn missing_required_key_is_a_config_error() {
        let file = write_ini("[DEFAULT]\nclients = geth\n");
        let cli = cli_for(file.path().to_path_buf());
        let err = Config::load(&cli, "nonexistent-user", 1234).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { .. }));
    }
}
