//! Configuration cascade for lintrc
//!
//! This module resolves the analysis options that apply to a file:
//! - JSON config files, with `//` and `/* */` comments allowed
//! - Auto-discovery of `.jshintrc` (or a `jshintConfig` field in
//!   `package.json`) by walking up from the target, then `~/.jshintrc`
//! - Inheritance through a single-parent `extends` chain
//! - Glob-keyed `overrides` applied per file
//!
//! ## Precedence
//!
//! Built-in defaults (an empty document) are replaced by a discovered
//! config, which is replaced by an explicit `--config` file. Within the
//! chosen document, ancestors reached through `extends` are merged first and
//! the child last. Matching `overrides` entries are merged on top of that,
//! in declaration order.
//!
//! ## Example Configuration
//!
//! ```jsonc
//! {
//!   // inherit shared settings
//!   "extends": "../base.jshintrc",
//!   "undef": true,
//!   "globals": { "jQuery": false },
//!   "prereq": ["vendor/polyfills.js"],
//!   "overrides": {
//!     "test/**/*.js": {
//!       "globals": { "describe": false, "it": false }
//!     }
//!   }
//! }
//! ```

mod document;
mod loader;
mod merge;
mod overrides;

pub use document::{
    EXTENDS_KEY, EffectiveConfig, GLOBALS_KEY, MANIFEST_CONFIG_KEY, MANIFEST_FILE_NAME,
    OVERRIDES_KEY, PREDEF_KEY, PREREQ_KEY, RC_FILE_NAME, ResolvedConfig, parse_document,
};
pub use loader::{ConfigLoader, DiscoveredConfig, home_dir};
pub use merge::deep_merge;
pub use overrides::{apply_overrides, override_matches};
