use inquire::{Confirm, Password};
use std::fs;
use std::path::Path;

const TOKEN_PLACEHOLDER: &str = "your_token_here";

pub async fn run(output_dir: &Path) -> anyhow::Result<()> {
    println!("🚀 todosync setup\n");

    let env_path = output_dir.join(".env");

    if env_path.exists() {
        let overwrite = Confirm::new(&format!(
            ".env file already exists at {}. Overwrite?",
            env_path.display()
        ))
        .with_default(false)
        .prompt()?;

        if !overwrite {
            println!("Initialization cancelled.");
            return Ok(());
        }
    }

    let token = Password::new("Todoist API token (leave empty to fill in later):")
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Todoist Settings → Integrations → Developer")
        .prompt()?;

    fs::create_dir_all(output_dir)?;
    fs::write(&env_path, build_env_file(token.trim()))?;

    println!("\n✅ Created .env at {}", env_path.display());
    println!("\nNext steps:");
    if token.trim().is_empty() {
        println!("  1. Edit .env and add your Todoist API token");
        println!("     (https://todoist.com/prefs/integrations)");
    } else {
        println!("  1. Review .env if needed");
    }
    println!("  2. Run 'todosync test' to verify your setup");
    println!("  3. Run 'todosync export' or 'todosync schedule'");

    Ok(())
}

fn build_env_file(token: &str) -> String {
    let token = if token.is_empty() {
        TOKEN_PLACEHOLDER
    } else {
        token
    };

    let mut content = String::from("# todosync environment\n\n");

    content.push_str("# ===================\n");
    content.push_str("# Todoist\n");
    content.push_str("# ===================\n");
    content.push_str("# Get your token from: https://todoist.com/prefs/integrations\n");
    content.push_str(&format!("TODOIST_API_TOKEN={}\n", token));

    content.push_str("\n# ===================\n");
    content.push_str("# Export defaults\n");
    content.push_str("# ===================\n");
    content.push_str("# EXPORT_OUTPUT_DIR=./obsidian_export\n");
    content.push_str("# EXPORT_INCLUDE_COMPLETED=false\n");
    content.push_str("# EXPORT_INCLUDE_COMMENTS=true\n");
    content.push_str("# EXPORT_TAG_PREFIX=todoist\n");

    content.push_str("\n# ===================\n");
    content.push_str("# Logging\n");
    content.push_str("# ===================\n");
    content.push_str("# RUST_LOG=todosync=info\n");

    content
}
