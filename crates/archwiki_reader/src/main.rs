mod terminal;

use std::path::{Path, PathBuf};

use anyhow::Result;
use archwiki_reader_core::bootstrap::{
    check_installation, ensure_index, index_marker_path, prepare_page_directory, probe_installation,
    spawn_index_rebuild,
};
use archwiki_reader_core::cache::PageCache;
use archwiki_reader_core::category::{open_update_category_picker, update_category};
use archwiki_reader_core::commands::{COMMANDS, CommandId, lookup_command};
use archwiki_reader_core::config::{ConfigPatch, ReaderConfig, load_config, patch_config};
use archwiki_reader_core::notice::Notice;
use archwiki_reader_core::picker::Presenter;
use archwiki_reader_core::process::{ArchWikiCli, WikiCli};
use archwiki_reader_core::resolver::PageResolver;
use archwiki_reader_core::runtime::{
    PathOverrides, ResolutionContext, ResolvedPaths, init_layout, normalize_for_display,
    resolve_paths,
};
use clap::{Args, CommandFactory, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::terminal::TerminalPresenter;

#[derive(Debug, Parser)]
#[command(
    name = "archwiki-reader",
    version,
    about = "Read ArchWiki pages through archwiki-rs into a local markdown vault"
)]
struct Cli {
    #[arg(long, global = true, value_name = "PATH")]
    vault_root: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Print resolved runtime diagnostics")]
    diagnostics: bool,
    #[arg(short, long, global = true, help = "Log progress to stderr")]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone)]
struct RuntimeOptions {
    vault_root: Option<PathBuf>,
    config: Option<PathBuf>,
    diagnostics: bool,
}

impl RuntimeOptions {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            vault_root: cli.vault_root.clone(),
            config: cli.config.clone(),
            diagnostics: cli.diagnostics,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Read an ArchWiki page (picker when PAGE is omitted)")]
    Read(ReadArgs),
    #[command(
        name = "update-category",
        about = "Update pages in an ArchWiki category (picker when CATEGORY is omitted)"
    )]
    UpdateCategory(UpdateCategoryArgs),
    #[command(about = "Interactive command palette")]
    Palette,
    Settings(SettingsArgs),
    Status(StatusArgs),
    Init(InitArgs),
}

#[derive(Debug, Args)]
struct ReadArgs {
    page: Option<String>,
}

#[derive(Debug, Args)]
struct UpdateCategoryArgs {
    category: Option<String>,
}

#[derive(Debug, Args)]
struct SettingsArgs {
    #[command(subcommand)]
    command: SettingsSubcommand,
}

#[derive(Debug, Subcommand)]
enum SettingsSubcommand {
    Show {
        #[arg(long)]
        json: bool,
    },
    #[command(name = "set-page-dir", about = "Where downloaded ArchWiki pages are stored")]
    SetPageDir { directory: String },
    #[command(name = "set-binary")]
    SetBinary { binary: String },
    #[command(name = "set-open-command", about = "Viewer for displayed pages (empty clears)")]
    SetOpenCommand { command: String },
}

#[derive(Debug, Args)]
struct StatusArgs {
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct InitArgs {
    #[arg(long, help = "Overwrite an existing config file")]
    force: bool,
}

struct Session {
    paths: ResolvedPaths,
    config: ReaderConfig,
    binary: String,
    cli: ArchWikiCli,
    cache: PageCache,
}

impl Session {
    fn open(runtime: &RuntimeOptions) -> Result<Self> {
        let paths = resolve_runtime_paths(runtime)?;
        let config = load_config(&paths.config_path)?;
        let binary = config.cli_binary();
        let cache = PageCache::new(paths.page_dir(&config));
        if runtime.diagnostics {
            eprintln!("[diagnostics]\n{}", paths.diagnostics(&config));
        }
        Ok(Self {
            cli: ArchWikiCli::new(&binary),
            paths,
            config,
            binary,
            cache,
        })
    }

    fn presenter(&self) -> Result<TerminalPresenter> {
        TerminalPresenter::new(self.config.open_command())
    }

    /// Probe the tool, build a missing index in the foreground and create the
    /// page directory. `false` disables every command.
    fn activate(&self, presenter: &mut TerminalPresenter) -> Result<bool> {
        if !check_installation(&self.cli, presenter, &self.binary) {
            return Ok(false);
        }
        ensure_index(&self.cli, presenter, &self.binary);
        prepare_page_directory(&self.cache, presenter)?;
        Ok(true)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let runtime = RuntimeOptions::from_cli(&cli);

    match cli.command {
        Some(Commands::Read(args)) => run_read(&runtime, args),
        Some(Commands::UpdateCategory(args)) => run_update_category(&runtime, args),
        Some(Commands::Palette) => run_palette(&runtime),
        Some(Commands::Settings(SettingsArgs { command })) => run_settings(&runtime, command),
        Some(Commands::Status(args)) => run_status(&runtime, args),
        Some(Commands::Init(args)) => run_init(&runtime, args),
        None => {
            let mut command = Cli::command();
            command.print_help()?;
            println!();
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_read(runtime: &RuntimeOptions, args: ReadArgs) -> Result<()> {
    let session = Session::open(runtime)?;
    let mut presenter = session.presenter()?;
    if !session.activate(&mut presenter)? {
        return Ok(());
    }
    read_page(&session.cli, &session.cache, &mut presenter, args.page.as_deref())
}

fn read_page<C: WikiCli, P: Presenter>(
    cli: &C,
    cache: &PageCache,
    presenter: &mut P,
    page: Option<&str>,
) -> Result<()> {
    let mut resolver = PageResolver::new(cli, presenter, cache);
    let resolution = match page.map(str::trim).filter(|page| !page.is_empty()) {
        Some(page) => resolver.resolve_page(page)?,
        None => resolver.open_read_page_picker()?,
    };
    info!(?resolution, "read-page finished");
    Ok(())
}

fn run_update_category(runtime: &RuntimeOptions, args: UpdateCategoryArgs) -> Result<()> {
    let session = Session::open(runtime)?;
    let mut presenter = session.presenter()?;
    if !session.activate(&mut presenter)? {
        return Ok(());
    }
    update_category_command(&session.cli, &mut presenter, args.category.as_deref())
}

fn update_category_command<C: WikiCli, P: Presenter>(
    cli: &C,
    presenter: &mut P,
    category: Option<&str>,
) -> Result<()> {
    let outcome = match category.map(str::trim).filter(|category| !category.is_empty()) {
        Some(category) => update_category(cli, presenter, category)?,
        None => open_update_category_picker(cli, presenter)?,
    };
    info!(?outcome, "update-category finished");
    Ok(())
}

fn run_palette(runtime: &RuntimeOptions) -> Result<()> {
    let session = Session::open(runtime)?;
    let mut presenter = session.presenter()?;
    if !check_installation(&session.cli, &mut presenter, &session.binary) {
        return Ok(());
    }
    let mut rebuild = spawn_index_rebuild(session.cli.clone(), &mut presenter, &session.binary);
    prepare_page_directory(&session.cache, &mut presenter)?;

    eprintln!("commands:");
    for command in COMMANDS {
        eprintln!(
            "  {:<16} {:<14} {}",
            command.slug,
            command.hotkey.to_string(),
            command.name
        );
    }
    eprintln!("  type a command or its hotkey letter, q to quit");

    loop {
        if rebuild.as_ref().is_some_and(|job| job.is_finished())
            && let Some(job) = rebuild.take()
        {
            presenter.notify(job.wait().notice);
        }

        let Some(line) = presenter.read_line("> ")? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
            break;
        }
        let Some(command) = lookup_command(input) else {
            eprintln!("unknown command: {input}");
            continue;
        };
        debug!(command = command.slug, "palette command");
        run_palette_command(&session.cli, &session.cache, &mut presenter, command.id);
    }

    if let Some(job) = rebuild {
        if !job.is_finished() {
            eprintln!("waiting for the page index to finish building...");
        }
        presenter.notify(job.wait().notice);
    }
    Ok(())
}

/// Run one palette command. Failures become notices so the session goes on.
fn run_palette_command<C: WikiCli, P: Presenter>(
    cli: &C,
    cache: &PageCache,
    presenter: &mut P,
    command: CommandId,
) {
    let result = match command {
        CommandId::ReadPage => read_page(cli, cache, presenter, None),
        CommandId::UpdateCategory => update_category_command(cli, presenter, None),
    };
    if let Err(error) = result {
        warn!(?command, error = %format!("{error:#}"), "palette command failed");
        presenter.notify(Notice::error(format!("{error:#}")));
    }
}

fn run_settings(runtime: &RuntimeOptions, command: SettingsSubcommand) -> Result<()> {
    let session = Session::open(runtime)?;
    let patch = match command {
        SettingsSubcommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&session.config)?);
            } else {
                println!("config_path: {}", normalize_path(&session.paths.config_path));
                println!("page_directory: {}", session.config.page_directory());
                println!(
                    "page_dir: {}",
                    normalize_path(&session.paths.page_dir(&session.config))
                );
                println!("cli_binary: {}", session.binary);
                println!(
                    "open_command: {}",
                    session
                        .config
                        .open_command()
                        .unwrap_or_else(|| "<none>".to_string())
                );
            }
            return Ok(());
        }
        SettingsSubcommand::SetPageDir { directory } => ConfigPatch {
            set_page_directory: Some(directory),
            ..ConfigPatch::default()
        },
        SettingsSubcommand::SetBinary { binary } => ConfigPatch {
            set_binary: Some(binary),
            ..ConfigPatch::default()
        },
        SettingsSubcommand::SetOpenCommand { command } => ConfigPatch {
            set_open_command: Some(command),
            ..ConfigPatch::default()
        },
    };

    let wrote = patch_config(&session.paths.config_path, &patch)?;
    if wrote {
        println!("Updated {}", normalize_path(&session.paths.config_path));
    } else {
        println!(
            "No change: {} already has that value",
            normalize_path(&session.paths.config_path)
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct StatusReport {
    binary: String,
    tool_installed: bool,
    index_marker: Option<String>,
    index_present: bool,
    vault_root: String,
    page_dir: String,
    page_dir_exists: bool,
    cached_pages: usize,
    config_path: String,
    config_exists: bool,
}

fn run_status(runtime: &RuntimeOptions, args: StatusArgs) -> Result<()> {
    let session = Session::open(runtime)?;
    let tool_installed = probe_installation(&session.cli);
    let index_marker = if tool_installed {
        index_marker_path(&session.cli)
    } else {
        None
    };
    let report = StatusReport {
        binary: session.binary.clone(),
        tool_installed,
        index_present: index_marker.as_deref().is_some_and(Path::is_file),
        index_marker: index_marker.as_deref().map(normalize_path),
        vault_root: normalize_path(&session.paths.vault_root),
        page_dir: normalize_path(session.cache.dir()),
        page_dir_exists: session.cache.dir().is_dir(),
        cached_pages: session.cache.cached_page_count()?,
        config_path: normalize_path(&session.paths.config_path),
        config_exists: session.paths.config_path.exists(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("archwiki-reader status");
    println!("binary: {}", report.binary);
    println!("tool_installed: {}", format_flag(report.tool_installed));
    println!(
        "index_marker: {}",
        report.index_marker.as_deref().unwrap_or("n/a")
    );
    println!("index_present: {}", format_flag(report.index_present));
    println!("vault_root: {}", report.vault_root);
    println!("page_dir: {}", report.page_dir);
    println!("page_dir_exists: {}", format_flag(report.page_dir_exists));
    println!("cached_pages: {}", report.cached_pages);
    println!("config_path: {}", report.config_path);
    println!("config_exists: {}", format_flag(report.config_exists));
    Ok(())
}

fn run_init(runtime: &RuntimeOptions, args: InitArgs) -> Result<()> {
    let session = Session::open(runtime)?;
    let report = init_layout(&session.paths, &session.config, args.force)?;

    println!("Initialized archwiki-reader vault layout");
    println!("vault_root: {}", normalize_path(&session.paths.vault_root));
    println!("state_dir: {}", normalize_path(&session.paths.state_dir));
    println!("page_dir: {}", normalize_path(session.cache.dir()));
    println!("config_path: {}", normalize_path(&session.paths.config_path));
    println!("created_dirs: {}", report.created_dirs.len());
    println!("wrote_config: {}", report.wrote_config);
    Ok(())
}

fn resolve_runtime_paths(runtime: &RuntimeOptions) -> Result<ResolvedPaths> {
    dotenvy::dotenv().ok();

    let context = ResolutionContext::from_process()?;
    let overrides = PathOverrides {
        vault_root: runtime.vault_root.clone(),
        config: runtime.config.clone(),
    };

    let initial = resolve_paths(&context, &overrides)?;
    let vault_env = initial.vault_root.join(".env");
    if vault_env.exists() {
        let _ = dotenvy::from_path_override(&vault_env);
    }

    resolve_paths(&context, &overrides)
}

fn normalize_path(path: &Path) -> String {
    normalize_for_display(path)
}

fn format_flag(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
