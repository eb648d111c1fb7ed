//! `inspcalc access` command - check what an access key grants

use console::style;
use dialoguer::{theme::ColorfulTheme, Password};
use miette::{IntoDiagnostic, Result};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{authorize, authorize_optional, Capability, Config};

#[derive(clap::Args, Debug)]
pub struct AccessArgs {
    /// Prompt for the key instead of reading --access-key
    #[arg(long)]
    pub prompt: bool,
}

pub fn run(args: AccessArgs, global: &GlobalOpts) -> Result<()> {
    let granted = if args.prompt {
        let key = Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Access key")
            .allow_empty_password(true)
            .interact()
            .into_diagnostic()?;
        authorize(&key)?
    } else {
        authorize_optional(global.access_key.as_deref())?
    };

    let format = global
        .format
        .resolve(Config::load().default_format.as_deref(), OutputFormat::Tsv);
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "capability": granted,
                "can_delete": granted.can_delete(),
            });
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            println!("capability: {}", granted);
            println!("can_delete: {}", granted.can_delete());
        }
        _ => {
            if global.quiet {
                println!("{}", granted);
            } else {
                let what = match granted {
                    Capability::Elevated => "calculate, save, view and delete history",
                    Capability::Standard => "calculate, save and view history",
                };
                println!(
                    "{} {} access: {}",
                    style("✓").green(),
                    style(granted).cyan(),
                    what
                );
            }
        }
    }

    Ok(())
}
