use tracing::debug;

use crate::asc::AppStoreConnectClient;
use crate::error::ResolutionError;

/// Printed whenever no prior build can be resolved.
pub const FALLBACK_BUILD_NUMBER: u64 = 1;

pub struct BuildNumberResolver<'a> {
    client: &'a AppStoreConnectClient,
    app_id: &'a str,
    platform: &'a str,
}

impl<'a> BuildNumberResolver<'a> {
    pub fn new(client: &'a AppStoreConnectClient, app_id: &'a str, platform: &'a str) -> Self {
        Self {
            client,
            app_id,
            platform,
        }
    }

    /// Build number of the newest build of the newest pre-release version.
    pub async fn current_build_number(&self) -> Result<u64, ResolutionError> {
        let version = self
            .client
            .latest_pre_release_version(self.app_id, self.platform)
            .await?;
        debug!(id = %version.id, version = %version.version, "latest pre-release version");
        let build = self.client.latest_build_for_version(&version.id).await?;
        debug!(id = %build.id, version = %build.version, "latest build");
        build.build_number()
    }

    /// Next build number. Never fails; see [`next_build_number`].
    pub async fn resolve(&self) -> u64 {
        next_build_number(self.current_build_number().await)
    }
}

/// Treats any lookup failure as "no prior build" and increments.
///
/// A first-ever build and a failed lookup both come out as
/// [`FALLBACK_BUILD_NUMBER`].
pub fn next_build_number(current: Result<u64, ResolutionError>) -> u64 {
    let current = current.unwrap_or_else(|err| {
        debug!(error = %err, "could not resolve current build number, assuming 0");
        0
    });
    current.saturating_add(1)
}
