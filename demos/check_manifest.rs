use manifest_studio::types::StudioError;
use manifest_studio::{extract, insert_permission, validate, InsertStatus};
use std::env;
use std::error::Error;
use std::fs;

// Validates an AndroidManifest.xml and prints the builder fields extracted from it.
// With a second argument the permission is spliced in and the result printed instead.

//Usage: check_manifest <AndroidManifest.xml> [permission]
fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <AndroidManifest.xml> [permission]", args[0]);
        std::process::exit(2);
    }

    match run(&args[1], args.get(2).map(String::as_str)) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Aborted due to error: {e}");
            std::process::exit(2);
        }
    }
}

fn run(path: &str, permission: Option<&str>) -> Result<bool, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;

    if let Some(permission) = permission {
        let result = insert_permission(&text, permission);
        return match result.status {
            InsertStatus::Inserted => {
                println!("{}", result.text);
                Ok(true)
            }
            InsertStatus::AlreadyExists => {
                eprintln!("{permission} is already declared in {path}");
                Ok(true)
            }
            InsertStatus::ManifestNotFound => {
                Err(Box::new(StudioError::new("Could not find manifest element")))
            }
        };
    }

    let verdict = validate(&text);
    if verdict.is_valid {
        println!("{path}: valid");
    } else {
        println!(
            "{path}: {} error(s), {} warning(s)",
            verdict.error_count(),
            verdict.warning_count()
        );
        for diagnostic in &verdict.diagnostics {
            println!("  {diagnostic}");
        }
    }

    if let Some(info) = extract(&text) {
        println!("package:     {}", info.fields.package_name);
        println!("label:       {}", info.fields.application_label);
        for activity in &info.activity_details {
            let name = activity.name.as_deref().unwrap_or("(unnamed)");
            let marker = if activity.launcher { " (launcher)" } else { "" };
            println!("activity:    {name}{marker}");
        }
        for permission in &info.fields.permissions {
            println!("permission:  {permission}");
        }
    }

    Ok(verdict.is_valid)
}
