use log::Level;
use serde::Deserialize;
use thiserror::Error;

/// Runtime configuration for the WWTRAIL directory core.
///
/// Values are loaded from (in order): a config file - in the
/// `/etc/wwtrail/wwtrail.json` file, and in the user config folder
/// (optional), and environment variables prefixed with `WWT_` (e.g.
/// `WWT_DEFAULT_PAGE_SIZE`). This is a small, intentionally conservative
/// bootstrap for the project's configuration system.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct Settings {
	pub log_level: Level,
	// Listing windows: default and hard ceiling for page sizes
	pub default_page_size: u32,
	pub max_page_size: u32,
	// Upper bound on competition/edition slug length
	pub slug_max_len: u32,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			log_level: Level::Info,
			default_page_size: 20,
			max_page_size: 100,
			slug_max_len: 64,
		}
	}
}

#[derive(Debug, Error)]
pub enum SettingsError {
	#[error("configuration error: {0}")]
	Config(#[from] config::ConfigError),
}

pub fn load() -> Result<Settings, SettingsError> {
	let mut builder = config::Config::builder()
		.add_source(config::File::with_name("/etc/wwtrail/wwtrail.json").required(false));

	if let Some(folder) = dirs::config_dir() {
		let user_config_path = folder.join("wwtrail").join("wwtrail.json");
		builder = builder.add_source(config::File::from(user_config_path).required(false));
	}
	if let Some(folder) = dirs::config_local_dir() {
		let local_config_path = folder.join("wwtrail").join("wwtrail.json");
		builder = builder.add_source(config::File::from(local_config_path).required(false));
	}

	builder = builder.add_source(config::Environment::with_prefix("WWT").separator("__"));

	let cfg = builder.build()?;

	let mut s: Settings = cfg.try_deserialize()?;

	// Explicitly prefer direct environment variables when present. Some
	// environments (CI, test harnesses) may set env vars in ways that the
	// `config` crate doesn't map as expected; read them directly to ensure
	// explicit overrides take effect.
	if let Ok(l) = std::env::var("WWT_LOG_LEVEL") {
		if !l.is_empty() {
			if let Ok(parsed) = l.parse::<Level>() {
				s.log_level = parsed;
			}
		}
	}
	if let Ok(p) = std::env::var("WWT_DEFAULT_PAGE_SIZE") {
		if let Ok(parsed) = p.parse::<u32>() {
			s.default_page_size = parsed;
		}
	}
	if let Ok(p) = std::env::var("WWT_MAX_PAGE_SIZE") {
		if let Ok(parsed) = p.parse::<u32>() {
			s.max_page_size = parsed;
		}
	}
	if let Ok(n) = std::env::var("WWT_SLUG_MAX_LEN") {
		if let Ok(parsed) = n.parse::<u32>() {
			s.slug_max_len = parsed;
		}
	}

	Ok(s)
}

#[cfg(test)]
#[cfg(feature = "unit-tests")]
mod tests {
	use std::env;

	use log::Level;

	use crate::config::{Settings, load};

	#[test]
	fn test_load_defaults_and_env_overlay() {
		// Save original values so we can restore them
		let orig_level = env::var_os("WWT_LOG_LEVEL");
		let orig_page = env::var_os("WWT_DEFAULT_PAGE_SIZE");
		let orig_max = env::var_os("WWT_MAX_PAGE_SIZE");
		let orig_slug = env::var_os("WWT_SLUG_MAX_LEN");

		// Ensure environment is clean for the defaults check
		unsafe { env::remove_var("WWT_LOG_LEVEL") };
		unsafe { env::remove_var("WWT_DEFAULT_PAGE_SIZE") };
		unsafe { env::remove_var("WWT_MAX_PAGE_SIZE") };
		unsafe { env::remove_var("WWT_SLUG_MAX_LEN") };

		let s = load().expect("load should succeed with defaults");
		let d = Settings::default();
		assert_eq!(s.log_level, d.log_level);
		assert_eq!(s.default_page_size, d.default_page_size);
		assert_eq!(s.max_page_size, d.max_page_size);
		assert_eq!(s.slug_max_len, d.slug_max_len);

		// Overlay environment values and verify they take effect
		unsafe { env::set_var("WWT_LOG_LEVEL", "debug") };
		unsafe { env::set_var("WWT_DEFAULT_PAGE_SIZE", "50") };
		unsafe { env::set_var("WWT_MAX_PAGE_SIZE", "500") };
		unsafe { env::set_var("WWT_SLUG_MAX_LEN", "80") };

		let s2 = load().expect("load should succeed with env");
		assert_eq!(s2.log_level, Level::Debug);
		assert_eq!(s2.default_page_size, 50);
		assert_eq!(s2.max_page_size, 500);
		assert_eq!(s2.slug_max_len, 80);

		// restore originals
		match orig_level {
			Some(v) => unsafe { env::set_var("WWT_LOG_LEVEL", v) },
			None => unsafe { env::remove_var("WWT_LOG_LEVEL") },
		}
		match orig_page {
			Some(v) => unsafe { env::set_var("WWT_DEFAULT_PAGE_SIZE", v) },
			None => unsafe { env::remove_var("WWT_DEFAULT_PAGE_SIZE") },
		}
		match orig_max {
			Some(v) => unsafe { env::set_var("WWT_MAX_PAGE_SIZE", v) },
			None => unsafe { env::remove_var("WWT_MAX_PAGE_SIZE") },
		}
		match orig_slug {
			Some(v) => unsafe { env::set_var("WWT_SLUG_MAX_LEN", v) },
			None => unsafe { env::remove_var("WWT_SLUG_MAX_LEN") },
		}
	}
}
