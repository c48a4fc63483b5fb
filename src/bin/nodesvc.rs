use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use nodesvc::{manifest, paths, Defaults, Registry, Service, Verb};

struct Options {
    manifest: Option<PathBuf>,
    config: Option<PathBuf>,
    command: Option<String>,
    service: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red(), e);
        let code = e
            .downcast_ref::<nodesvc::Error>()
            .map(nodesvc::Error::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(&args)?;

    let Some(command) = options.command.as_deref() else {
        print_usage();
        return Ok(());
    };

    if matches!(command, "help" | "--help" | "-h") {
        print_usage();
        return Ok(());
    }

    let mut defaults = Defaults::detect(options.config.as_deref())?;
    if let Some(manifest) = &options.manifest {
        defaults.manifest_path = paths::absolute(manifest);
    }
    let registry = Registry::new(defaults);

    match command {
        "list" | "ls" => list(&registry),
        "init" => {
            let defaults = registry.defaults();
            let package = defaults.base_working_directory.join("package.json");
            let count = manifest::init_from_package(&package, &defaults.manifest_path)?;
            println!(
                "{} Wrote {} with {} service(s)",
                "✓".green(),
                defaults.manifest_path.display(),
                count
            );
            Ok(())
        }
        "generate" => {
            for service in select(&registry, options.service.as_deref())? {
                let path = service.generate_script()?;
                println!("{} {} -> {}", "✓".green(), service.name, path.display());
            }
            Ok(())
        }
        other => {
            let verb: Verb = match other.parse() {
                Ok(verb) => verb,
                Err(msg) => {
                    eprintln!("{}", msg);
                    print_usage();
                    std::process::exit(1);
                }
            };
            for service in select(&registry, options.service.as_deref())? {
                println!("{} {}...", capitalize(verb.as_str()), service.name);
                service
                    .run_command(verb)
                    .with_context(|| format!("{} {}", verb, service.name))?;
            }
            Ok(())
        }
    }
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options {
        manifest: None,
        config: None,
        command: None,
        service: None,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--manifest" | "-m" => {
                let Some(value) = iter.next() else {
                    bail!("{} requires a path", arg);
                };
                options.manifest = Some(PathBuf::from(value));
            }
            "--config" | "-c" => {
                let Some(value) = iter.next() else {
                    bail!("{} requires a path", arg);
                };
                options.config = Some(PathBuf::from(value));
            }
            _ if options.command.is_none() => options.command = Some(arg.clone()),
            _ if options.service.is_none() => options.service = Some(arg.clone()),
            _ => bail!("Unexpected argument: {}", arg),
        }
    }

    Ok(options)
}

/// One named service, or all of them
fn select(registry: &Registry, name: Option<&str>) -> Result<Vec<Service>> {
    match name {
        Some(name) => match registry.get_service(name)? {
            Some(service) => Ok(vec![service]),
            None => bail!(
                "No service named {} in {}",
                name,
                registry.defaults().manifest_path.display()
            ),
        },
        None => Ok(registry.all_services()?),
    }
}

fn list(registry: &Registry) -> Result<()> {
    let services = registry.all_services()?;
    if services.is_empty() {
        println!(
            "No services in {}",
            registry.defaults().manifest_path.display()
        );
        return Ok(());
    }

    for service in services {
        println!("{} ({})", service.name.bold(), service.platform);
        println!("  module:  {}", service.module);
        println!("  script:  {}", service.script_path().display());
        println!("  workdir: {}", service.working_directory().display());
        println!("  log:     {}", service.log_file().display());
    }

    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn print_usage() {
    println!(
        r#"nodesvc - Manage Node.js services through the host service manager

Usage:
    nodesvc [options] <command> [service]

Commands:
    init                Create service.json from the dependencies in package.json
    list                List services from the manifest
    generate [service]  Write init scripts / launch agents (all if no service given)
    start [service]     Start one or all services
    stop [service]      Stop one or all services
    restart [service]   Restart one or all services
    help                Show this help message

Options:
    -m, --manifest <path>  Manifest to read (default: ./service.json)
    -c, --config <path>    Defaults override file (default: ./nodesvc.yaml)

Environment:
    NODESVC_MANIFEST    Manifest to read
    NODESVC_PLATFORM    Platform tag (darwin, centos, ...) instead of the detected one
    RUST_LOG            Log filter, e.g. RUST_LOG=nodesvc=debug
"#
    );
}
