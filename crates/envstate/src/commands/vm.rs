use crate::output;
use crate::{Format, VmArgs, VmCommands};
use colored::Colorize;
use envstate_core::{DnsOptions, InstanceRequest, InstanceVerb, Ssh};

pub async fn handle(command: VmCommands) -> anyhow::Result<()> {
    let (verb, args) = match command {
        VmCommands::List(args) => (InstanceVerb::List, args),
        VmCommands::Start(args) => (InstanceVerb::Start, args),
        VmCommands::Status(args) => (InstanceVerb::Status, args),
        VmCommands::Stop(args) => (InstanceVerb::Stop, args),
    };

    let request = build_request(verb, &args);
    request.validate()?;

    let host = args.remote.host.as_deref();
    if host.is_some() && args.remote.format == Format::Json {
        println!("{}", serde_json::to_string_pretty(&request)?);
    }

    if args.remote.dry {
        println!("{}", format!("dry run: vm {verb} not executed").yellow());
        return Ok(());
    }

    let outcome = super::dispatcher(host).instance(&request).await?;
    output::print_outcome(&outcome, args.remote.format)
}

fn build_request(verb: InstanceVerb, args: &VmArgs) -> InstanceRequest {
    let mut request = InstanceRequest::new(verb, &args.name, &args.project, &args.zone);
    request.dns = DnsOptions {
        domain: args.domain.clone(),
        record_name: args.dns_record_name.clone(),
        record_type: args.dns_record_type.clone(),
    };
    request.ip = args
        .ip
        .iter()
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .collect();
    request.external_ip = args.external_ip;
    request.script = args.script.clone();
    request.ssh = Ssh {
        key: args.ssh_key.clone(),
        port: args.ssh_port,
        user: args.ssh_user.clone(),
    };
    request
}
