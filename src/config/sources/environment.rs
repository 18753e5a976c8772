//! Environment source: `AUTOPOST__SECTION__KEY` variables.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

/// Add the environment layer. `AUTOPOST_LOG*` and `AUTOPOST_ENV` use a single
/// underscore and are not picked up here.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("AUTOPOST")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
