#[macro_export]
/// Shortcut for implementing agent traits
macro_rules! impl_as_ref_core {
    ($agent:ident) => {
        impl AsRef<learnfi_base::agent::AgentCore> for $agent {
            fn as_ref(&self) -> &learnfi_base::agent::AgentCore {
                &self.core
            }
        }
    };
}

#[macro_export]
/// Declare a new agent struct with the additional fields
macro_rules! decl_agent {
    (
        $(#[$outer:meta])*
        $name:ident{
            $($prop:ident: $type:ty,)*
        }) => {

        $(#[$outer])*
        #[derive(Debug)]
        pub struct $name {
            $($prop: $type,)*
            core: learnfi_base::agent::AgentCore,
        }

        $crate::impl_as_ref_core!($name);
    };
}

#[macro_export]
/// Declare a new settings block
macro_rules! decl_settings {
    (
        $name:ident {
            $($(#[$tags:meta])* $prop:ident: $type:ty,)*
        }
    ) => {
        paste::paste! {
            #[derive(Debug, serde::Deserialize)]
            #[serde(rename_all = "camelCase")]
            #[doc = "Settings for `" $name]
            pub struct [<$name Settings>] {
                #[serde(flatten)]
                pub(crate) base: learnfi_base::settings::Settings,
                $(
                    $(#[$tags])*
                    pub(crate) $prop: $type,
                )*
            }

            impl AsRef<learnfi_base::settings::Settings> for [<$name Settings>] {
                fn as_ref(&self) -> &learnfi_base::settings::Settings {
                    &self.base
                }
            }

            impl [<$name Settings>] {
                /// Read settings from the config files and/or env
                ///
                /// Configs are loaded in the following precedence order:
                ///
                /// 1. The file specified by the `RUN_ENV` and `BASE_CONFIG`
                ///    env vars. `RUN_ENV/BASE_CONFIG`
                /// 2. The file specified by the `RUN_ENV` env var and the
                ///    agent's name. `RUN_ENV/AGENT-partial.json`
                /// 3. Configuration env vars with the prefix `LEARNFI_BASE`
                ///    intended to be shared by multiple agents in the same
                ///    environment
                /// 4. Configuration env vars with the prefix
                ///    `LEARNFI_AGENTNAME` intended to be used by a specific
                ///    agent
                ///
                /// Specify a configuration directory with the `RUN_ENV` env
                /// variable. Specify a configuration file with the
                /// `BASE_CONFIG` env variable.
                pub fn new() -> Result<Self, config::ConfigError> {
                    let env = std::env::var("RUN_ENV").unwrap_or_else(|_| "default".into());
                    let fname = std::env::var("BASE_CONFIG").unwrap_or_else(|_| "base".into());

                    config::Config::builder()
                        .add_source(config::File::with_name(&format!("./config/{}/{}", env, fname)))
                        .add_source(
                            config::File::with_name(&format!(
                                "./config/{}/{}-partial",
                                env,
                                stringify!($name).to_lowercase()
                            ))
                            .required(false),
                        )
                        .add_source(config::Environment::with_prefix("LEARNFI_BASE").separator("_"))
                        .add_source(
                            config::Environment::with_prefix(&format!(
                                "LEARNFI_{}",
                                stringify!($name).to_ascii_uppercase()
                            ))
                            .separator("_"),
                        )
                        .build()?
                        .try_deserialize()
                }
            }
        }
    }
}
