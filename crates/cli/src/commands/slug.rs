//! Product slug commands.

use anime_tribes_admin::config::AdminConfig;
use anime_tribes_admin::slug::{SlugAvailability, SlugClient, generate_slug};
use tracing::{info, warn};

pub fn generate(name: &str) {
    let slug = generate_slug(name);
    if slug.is_empty() {
        warn!("{name:?} has no characters usable in a slug");
    } else {
        info!("{slug}");
    }
}

/// Ask the backend configured by `BACKEND_BASE_URL` whether `slug` is taken.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the lookup fails.
pub async fn check(slug: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AdminConfig::from_env()?;
    let client = SlugClient::new(config.backend_base_url);

    match client.check(slug).await? {
        SlugAvailability::Available => info!("{slug} is available"),
        SlugAvailability::Taken => warn!("{slug} is already taken"),
        SlugAvailability::Unknown => warn!("Enter a slug to check"),
    }
    Ok(())
}
