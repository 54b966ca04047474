#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] fuzzer_config::ConfigError),
    #[error(transparent)]
    Core(#[from] fuzzer_core::Error),
    #[error(transparent)]
    Container(#[from] fuzzer_container::ContainerError),
    #[error("failed to create run directories: {0}")]
    Directories(#[from] std::io::Error),
}
