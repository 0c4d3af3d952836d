use anyhow::Result;
use clap::{CommandFactory, Parser};
use rusub_merge::cli::{Cli, Commands};
use rusub_merge::options::{log_filter, parse_tools, OptionMethod, Options};
use rusub_merge::runner::{root_lines, Runner};
use std::io::{self, BufRead};

fn init_logging(level: &str) {
    env_logger::Builder::new()
        .filter_level(log_filter(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn read_stdin() -> Vec<String> {
    let stdin = io::stdin();
    stdin.lock().lines().map_while(|l| l.ok()).collect()
}

fn print_help_for(sub: &str) {
    let mut cmd = Cli::command();
    if let Some(sc) = cmd.find_subcommand_mut(sub) {
        let _ = sc.print_help();
        println!();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Recon(args) => {
            init_logging(&args.common.log_level);
            let Some(domain) = args.common.domain.clone() else {
                print_help_for("recon");
                return Ok(());
            };
            let common = args.common;
            let opt = Options {
                method: OptionMethod::Recon,
                target: domain,
                tools: parse_tools(&args.tools)?,
                crtsh: !args.no_crtsh,
                tool_timeout: args.tool_timeout,
                crtsh_timeout: args.crtsh_timeout,
                crtsh_raw: Some(args.crtsh_raw),
                work_dir: args.work_dir,
                inputs: Vec::new(),
                crtsh_json: None,
                stdin_lines: if common.stdin { read_stdin() } else { Vec::new() },
                output: common.output,
                output_type: common.output_type,
                gzip: common.gzip,
                root_strategy: common.root_strategy,
                log_level: common.log_level,
            };
            log::debug!("Parsed Options: {:#?}", opt);
            let runner = Runner::new(opt)?;
            runner.run().await?;
        }
        Commands::Merge(args) => {
            init_logging(&args.common.log_level);
            let Some(domain) = args.common.domain.clone() else {
                print_help_for("merge");
                return Ok(());
            };
            let common = args.common;
            let opt = Options {
                method: OptionMethod::Merge,
                target: domain,
                tools: Vec::new(),
                crtsh: false,
                tool_timeout: 0,
                crtsh_timeout: 0,
                crtsh_raw: None,
                work_dir: None,
                inputs: args.inputs,
                crtsh_json: args.crtsh_json,
                stdin_lines: if common.stdin { read_stdin() } else { Vec::new() },
                output: common.output,
                output_type: common.output_type,
                gzip: common.gzip,
                root_strategy: common.root_strategy,
                log_level: common.log_level,
            };
            log::debug!("Parsed Options: {:#?}", opt);
            let runner = Runner::new(opt)?;
            runner.run().await?;
        }
        Commands::Root(args) => {
            let mut hosts = args.hosts;
            if args.stdin {
                hosts.extend(read_stdin());
            }
            if hosts.is_empty() {
                print_help_for("root");
                return Ok(());
            }
            let resolver = args.root_strategy.resolver();
            for line in root_lines(&hosts, resolver.as_ref()) {
                println!("{}", line);
            }
        }
    }

    Ok(())
}
