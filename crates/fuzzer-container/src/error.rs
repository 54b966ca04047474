/// Container Host Adapter errors (spec §4.A). `kill` and `remove_image`
/// are meant to be swallowed by callers on a "not found" condition — this
/// type still reports them so a caller can decide, but `DockerHost`
/// itself already treats not-found as success per the spec's stated
/// "best-effort" rationale.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("failed to spawn `docker {0}`: {1}")]
    Spawn(String, #[source] std::io::Error),

    #[error("`docker {command}` exited with status {status}: {stderr}")]
    NonZeroExit {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("failed to wait on exec for container {0}: {1}")]
    Wait(String, #[source] std::io::Error),
}
