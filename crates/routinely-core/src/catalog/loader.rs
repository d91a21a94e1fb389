use tracing::{debug, warn};

use super::Catalog;
use crate::api::ApiClient;
use crate::error::CatalogError;

/// Fetch the routine catalog, degrading to the built-in list on any failure.
///
/// Never errors: an unreachable service, a bad status, a malformed body and a
/// missing endpoint all produce [`Catalog::fallback`].
pub async fn load_catalog(api: &ApiClient) -> Catalog {
    match api.fetch_catalog().await {
        Ok(entries) => {
            debug!(count = entries.len(), "routine catalog fetched");
            Catalog::remote(entries)
        }
        Err(CatalogError::NotConfigured) => {
            debug!("no catalog endpoint configured, using built-in routines");
            Catalog::fallback()
        }
        Err(err) => {
            warn!(error = %err, "routine catalog unavailable, using built-in routines");
            Catalog::fallback()
        }
    }
}
