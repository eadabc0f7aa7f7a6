use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("stackpilot")
        .about("Deployment orchestrator for a fleet monitoring stack")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("command")
                .help("Operation to run")
                .value_parser(["check", "validate", "deploy", "dry-run", "update", "info"])
                .default_value("deploy")
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Show debug output on the console"),
        )
        .arg(
            Arg::new("inventory")
                .short('i')
                .long("inventory")
                .help("Specify inventory file path (default: 'inventory.ini')")
                .value_name("INVENTORY"),
        )
        .arg(
            Arg::new("playbook")
                .short('p')
                .long("playbook")
                .help("Specify playbook file path (default: 'site.yml')")
                .value_name("PLAYBOOK"),
        )
}
