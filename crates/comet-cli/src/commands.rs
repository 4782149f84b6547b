use std::env;
use std::path::PathBuf;

use colored::Colorize;
use comet_sdk::{
    ComponentId, Diagnostic, Diagnostics, ImportOptions, StatusReport, Workspace,
};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Init(args) => cmd_init(args),
        Command::Create(args) => cmd_create(args),
        Command::Add(args) => cmd_add(args),
        Command::Commit(args) => cmd_commit(args).await,
        Command::Export(args) => cmd_export(args).await,
        Command::Import(args) => cmd_import(args, format).await,
        Command::Status(_) => cmd_status(format),
        Command::Remote(args) => cmd_remote(args),
    }
}

fn open_workspace() -> anyhow::Result<Workspace> {
    Ok(Workspace::discover(&env::current_dir()?)?)
}

fn parse_ids(ids: &[String]) -> anyhow::Result<Vec<ComponentId>> {
    Ok(ids
        .iter()
        .map(|s| ComponentId::parse(s))
        .collect::<Result<_, _>>()?)
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    let missing = diagnostics.missing_packages();
    if !missing.is_empty() {
        println!(
            "{}",
            "Missing package dependencies (install them with your package manager):"
                .yellow()
                .bold()
        );
        for (name, version) in missing {
            println!("  {name}: {version}");
        }
    }
    for diagnostic in diagnostics.iter() {
        if !matches!(diagnostic, Diagnostic::MissingPackageDependency { .. }) {
            println!("{} {}", "warning:".yellow(), diagnostic);
        }
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    let path = match args.path {
        Some(path) => path,
        None => env::current_dir()?,
    };
    if args.bare {
        let name = args
            .name
            .ok_or_else(|| anyhow::anyhow!("a bare scope needs --name"))?;
        std::fs::create_dir_all(&path)?;
        Workspace::init_bare(&path, &name)?;
        println!(
            "{} Initialized bare scope {} in {}",
            "✓".green().bold(),
            name.cyan(),
            path.display().to_string().bold()
        );
    } else {
        std::fs::create_dir_all(&path)?;
        let ws = Workspace::init(&path, args.name.as_deref())?;
        println!(
            "{} Initialized comet workspace in {}",
            "✓".green().bold(),
            path.display().to_string().bold()
        );
        println!("  Scope: {}", ws.scope_name().cyan());
    }
    Ok(())
}

fn cmd_create(args: CreateArgs) -> anyhow::Result<()> {
    let mut ws = open_workspace()?;
    let id = ComponentId::parse(&args.id)?;
    let path = ws.create(&id, args.manifest)?;
    println!(
        "{} Created {} at {}",
        "✓".green().bold(),
        id.to_string().yellow(),
        path.display()
    );
    Ok(())
}

fn cmd_add(args: AddArgs) -> anyhow::Result<()> {
    let mut ws = open_workspace()?;
    let cwd = env::current_dir()?;
    let paths: Vec<PathBuf> = args.paths.iter().map(|p| cwd.join(p)).collect();
    let id = args.id.as_deref().map(ComponentId::parse).transpose()?;
    let outcome = ws.add(&paths, id.as_ref(), args.main.as_deref())?;
    println!(
        "{} Tracking {} ({} files)",
        "✓".green().bold(),
        outcome.id.to_string().yellow(),
        outcome.files.len()
    );
    for file in &outcome.files {
        println!("  {} {}", "added:".green(), file);
    }
    Ok(())
}

async fn cmd_commit(args: CommitArgs) -> anyhow::Result<()> {
    let mut ws = open_workspace()?;
    if let Some(author) = args.author {
        ws = ws.with_author(author);
    }
    let ids = parse_ids(&args.ids)?;
    let outcome = ws.commit(&ids, &args.message).await?;
    if outcome.committed.is_empty() {
        println!("Nothing to commit.");
    } else {
        println!(
            "{} Committed {} component(s)",
            "✓".green().bold(),
            outcome.committed.len()
        );
        for id in &outcome.committed {
            println!("  {}", id.to_string().yellow());
        }
    }
    for id in &outcome.unchanged {
        println!("  {} {}", "unchanged:".dimmed(), id);
    }
    print_diagnostics(&outcome.diagnostics);
    Ok(())
}

async fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut ws = open_workspace()?;
    let ids = parse_ids(&args.ids)?;
    let outcome = ws.export(&args.remote, &ids).await?;
    println!(
        "{} Exported {} component(s) to {} ({} new objects)",
        "✓".green().bold(),
        outcome.exported.len(),
        args.remote.bold(),
        outcome.objects_pushed
    );
    for id in &outcome.exported {
        println!("  {}", id.to_string().yellow());
    }
    Ok(())
}

async fn cmd_import(args: ImportArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut ws = open_workspace()?;
    let id = ComponentId::parse(&args.id)?;
    let options = ImportOptions {
        path: args
            .path
            .map(|p| env::current_dir().map(|cwd| cwd.join(p)))
            .transpose()?,
        overwrite: args.overwrite,
    };
    let outcome = ws.import(&id, options).await?;

    if let OutputFormat::Json = format {
        let dependencies: Vec<serde_json::Value> = outcome
            .dependencies
            .iter()
            .map(|(id, origin)| serde_json::json!({ "id": id, "origin": origin }))
            .collect();
        let value = serde_json::json!({
            "imported": outcome.imported,
            "dependencies": dependencies,
            "written": outcome.written,
            "skipped": outcome.skipped,
            "diagnostics": outcome.diagnostics,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "{} Imported {}",
        "✓".green().bold(),
        outcome.imported.to_string().yellow().bold()
    );
    for (dep, origin) in &outcome.dependencies {
        println!("  {} {} ({})", "dependency:".cyan(), dep, origin);
    }
    println!(
        "  {} files written, {} already up to date",
        outcome.written.len(),
        outcome.skipped.len()
    );
    print_diagnostics(&outcome.diagnostics);
    Ok(())
}

fn print_section(title: &str, empty: &str, ids: &[ComponentId]) {
    if ids.is_empty() {
        println!("{}", empty.dimmed());
        return;
    }
    println!("{}", title.bold());
    for id in ids {
        println!("     > {}", id.to_string().yellow());
    }
}

fn print_status(report: &StatusReport) {
    print_section(
        "New Components",
        "There are no new components",
        &report.new,
    );
    print_section(
        "Modified Components",
        "There are no modified components",
        &report.modified,
    );
    print_section(
        "Staged Components",
        "There are no staged components",
        &report.staged,
    );
    print_section(
        "Untracked Components",
        "There are no untracked components",
        &report.untracked,
    );
    print_diagnostics(&report.diagnostics);
}

fn cmd_status(format: OutputFormat) -> anyhow::Result<()> {
    let ws = open_workspace()?;
    let report = ws.status()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_status(&report),
    }
    Ok(())
}

fn cmd_remote(args: RemoteArgs) -> anyhow::Result<()> {
    let mut ws = open_workspace()?;
    match args.action {
        Some(RemoteAction::Add { path }) => {
            let name = ws.add_remote(&path)?;
            println!("Added remote {} → {}", name.bold(), path.display().to_string().blue());
        }
        None => {
            let remotes = ws.remotes();
            if remotes.is_empty() {
                println!("No remotes configured.");
            }
            for name in remotes {
                println!("{name}");
            }
        }
    }
    Ok(())
}
