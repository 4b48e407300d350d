use anyhow::Context;
use campus_records::{CampusConfig, FieldUpdate, RecordService};
use campus_types::StudentRecord;
use colored::Colorize;
use tracing::debug;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CampusConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    debug!(path = %cli.config.display(), "configuration loaded");

    if let Command::Config(args) = &cli.command {
        return cmd_config(&cli, &config, args);
    }

    let service = RecordService::open(&config).context("opening record stores")?;
    match cli.command {
        Command::Init(_) => cmd_init(&service, &cli.format).await,
        Command::Register(args) => cmd_register(&service, &cli.format, args).await,
        Command::Query(args) => cmd_query(&service, &cli.format, args).await,
        Command::Update(args) => cmd_update(&service, &cli.format, args).await,
        Command::List(args) => cmd_list(&service, &cli.format, args).await,
        Command::Config(_) => Ok(()),
    }
}

/// Pull already-published records into this process's snapshot so the next
/// write does not drop them.
async fn prepare_write(service: &RecordService) -> anyhow::Result<()> {
    let added = service
        .reseed()
        .await
        .context("reading existing records before write")?;
    debug!(added, "snapshot prepared");
    Ok(())
}

async fn cmd_init(service: &RecordService, format: &OutputFormat) -> anyhow::Result<()> {
    prepare_write(service).await?;
    let pointers = service.init_ledger().await?;
    match format {
        OutputFormat::Json => {
            let out: Vec<String> = pointers.iter().map(ToString::to_string).collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            println!(
                "{} Registered {} demo students",
                "✓".green().bold(),
                pointers.len().to_string().bold()
            );
            if let Some(last) = pointers.last() {
                println!("  Snapshot: {}", last.to_string().cyan());
            }
        }
    }
    Ok(())
}

async fn cmd_register(
    service: &RecordService,
    format: &OutputFormat,
    args: RegisterArgs,
) -> anyhow::Result<()> {
    let record = StudentRecord::new(args.registration_number, args.first_name)
        .with_last_name(args.last_name)
        .with_branch(args.branch)
        .with_blood_group(args.blood_group)
        .with_mobile_number(args.mobile_number)
        .with_address(args.address)
        .with_subjects(args.subjects);
    // Checked up front so a bad record costs no ledger scan.
    record.validate()?;

    prepare_write(service).await?;
    let key = record.registration_number.clone();
    let pointer = service.register(record).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "key": key, "cid": pointer })),
        OutputFormat::Text => {
            println!("{} Registered {}", "✓".green().bold(), key.yellow().bold());
            println!("  Snapshot: {}", pointer.to_string().cyan());
        }
    }
    Ok(())
}

async fn cmd_query(
    service: &RecordService,
    format: &OutputFormat,
    args: QueryArgs,
) -> anyhow::Result<()> {
    let key = args.registration_number;
    let record = service.lookup(&key).await?;
    let pointer = if args.pointer {
        Some(service.pointer_of(&key).await?)
    } else {
        None
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Text => {
            print_record(&record);
            if let Some(p) = pointer {
                println!("  {:<14}{}", "snapshot:", p.to_string().cyan());
            }
        }
    }
    Ok(())
}

async fn cmd_update(
    service: &RecordService,
    format: &OutputFormat,
    args: UpdateArgs,
) -> anyhow::Result<()> {
    let update = FieldUpdate::parse(&args.field, &args.value)?;
    let field = update.field();
    prepare_write(service).await?;
    let record = service
        .update_field(&args.registration_number, update)
        .await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Text => {
            println!(
                "{} Updated {} of {}",
                "✓".green().bold(),
                field.bold(),
                record.registration_number.yellow().bold()
            );
            print_record(&record);
        }
    }
    Ok(())
}

async fn cmd_list(
    service: &RecordService,
    format: &OutputFormat,
    args: ListArgs,
) -> anyhow::Result<()> {
    let records = service.list_range(&args.start, &args.end).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Text if records.is_empty() => println!("No records."),
        OutputFormat::Text => {
            for r in &records {
                println!(
                    "{}  {} {}  {}",
                    r.registration_number.yellow().bold(),
                    r.first_name,
                    r.last_name,
                    r.branch.dimmed()
                );
            }
            println!("{} record(s)", records.len().to_string().bold());
        }
    }
    Ok(())
}

fn cmd_config(cli: &Cli, config: &CampusConfig, args: &ConfigArgs) -> anyhow::Result<()> {
    let text = config.to_toml()?;
    if args.write {
        if cli.config.exists() {
            println!("{} already exists, left unchanged", cli.config.display());
        } else {
            std::fs::write(&cli.config, &text)
                .with_context(|| format!("writing {}", cli.config.display()))?;
            println!("{} Wrote {}", "✓".green().bold(), cli.config.display().to_string().bold());
        }
        return Ok(());
    }
    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Text => print!("{text}"),
    }
    Ok(())
}

fn print_record(r: &StudentRecord) {
    println!("{}", r.registration_number.yellow().bold());
    let name = format!("{} {}", r.first_name, r.last_name);
    for (label, value) in [
        ("name:", name.trim()),
        ("branch:", r.branch.as_str()),
        ("blood group:", r.blood_group.as_str()),
        ("mobile:", r.mobile_number.as_str()),
        ("address:", r.address.as_str()),
    ] {
        if !value.is_empty() {
            println!("  {:<14}{}", label, value);
        }
    }
    if !r.subjects.is_empty() {
        println!("  {:<14}{}", "subjects:", r.subjects.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_records::RecordError;
    use campus_types::ErrorKind;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[tokio::test]
    async fn file_ledger_over_memory_blobs_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("campus.toml");
        let ledger_path = dir.path().join("ledger.json");
        std::fs::write(
            &config_path,
            format!(
                "[blob]\nbackend = \"memory\"\n\n[ledger]\nbackend = \"file\"\npath = {:?}\n",
                ledger_path.display().to_string()
            ),
        )
        .unwrap();

        let err = run_command(parse(&["campus", "--config", config_path.to_str().unwrap(), "init"]))
            .await
            .unwrap_err();
        let err = err.downcast_ref::<RecordError>().unwrap();
        assert!(matches!(err, RecordError::Config(_)));
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
        assert!(!ledger_path.exists());
    }

    #[tokio::test]
    async fn init_then_list_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("campus.toml");
        std::fs::write(&config_path, "[blob]\nbackend = \"memory\"\n[ledger]\nbackend = \"memory\"\n")
            .unwrap();
        let config = config_path.to_str().unwrap();
        run_command(parse(&["campus", "--config", config, "init"]))
            .await
            .unwrap();
        run_command(parse(&["campus", "--config", config, "--format", "json", "list"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn register_rejects_blank_name_before_opening_scan() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("campus.toml");
        std::fs::write(&config_path, "[blob]\nbackend = \"memory\"\n[ledger]\nbackend = \"memory\"\n")
            .unwrap();
        let result = run_command(parse(&[
            "campus",
            "--config",
            config_path.to_str().unwrap(),
            "register",
            "1001",
            "--first-name",
            " ",
        ]))
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn unknown_update_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("campus.toml");
        std::fs::write(&config_path, "[blob]\nbackend = \"memory\"\n[ledger]\nbackend = \"memory\"\n")
            .unwrap();
        let result = run_command(parse(&[
            "campus",
            "--config",
            config_path.to_str().unwrap(),
            "update",
            "1001",
            "--field",
            "shoeSize",
            "--value",
            "9",
        ]))
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn config_write_creates_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campus.toml");
        let cli = parse(&["campus", "--config", path.to_str().unwrap(), "config", "--write"]);
        let config = CampusConfig::default();
        let Command::Config(args) = &cli.command else {
            panic!("wrong command");
        };
        cmd_config(&cli, &config, args).unwrap();
        let written = CampusConfig::load(&path).unwrap();
        assert_eq!(written, config);

        std::fs::write(&path, "[ledger]\nbackend = \"memory\"\n").unwrap();
        cmd_config(&cli, &config, args).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[ledger]\nbackend = \"memory\"\n"
        );
    }
}
