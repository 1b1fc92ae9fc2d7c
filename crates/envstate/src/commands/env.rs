use crate::output;
use crate::{EnvArgs, EnvCommands, Format};
use colored::Colorize;
use envstate_core::{EnvRequest, Selection, Verb};

pub async fn handle(command: EnvCommands) -> anyhow::Result<()> {
    let (verb, args) = match command {
        EnvCommands::Up(args) => (Verb::Up, args),
        EnvCommands::Down(args) => (Verb::Down, args),
        EnvCommands::Show(args) => (Verb::Show, args),
    };

    let selection = Selection::from_flags(args.name.as_deref(), args.all, &args.label)?;
    let path = envstate_config::find_environment_file(args.env_file.as_deref())?;
    tracing::debug!("environment file: {}", path.display());
    let data = envstate_core::load_environment_file(&path)?;

    let environments = data.select(&selection)?;
    if verb != Verb::Show && args.remote.format == Format::Text {
        for env in &environments {
            output::print_banner(&env.name, &env.label);
        }
    }

    let request = EnvRequest::new(verb, &selection, data);
    run(&args, &request).await
}

async fn run(args: &EnvArgs, request: &EnvRequest) -> anyhow::Result<()> {
    let host = args.remote.host.as_deref();

    if host.is_some() && args.remote.format == Format::Json {
        println!("{}", serde_json::to_string_pretty(request)?);
    }

    if args.remote.dry {
        println!(
            "{}",
            format!("dry run: env {} not executed", request.verb).yellow()
        );
        return Ok(());
    }

    let outcome = super::dispatcher(host).env(request).await?;
    output::print_outcome(&outcome, args.remote.format)
}
