mod cli;

use clap::Parser;
use cli::{BindAckCmd, BindCmd, Cli, Commands, OutputArgs, ShareEnumCmd, SharesCmd};
use smb_rpc::{packets::util::hex_dump, SrvSvc};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Bind(cmd) => {
            log::info!("Building bind request (call id {})", cmd.call_id);
            bind(cmd)?;
        }
        Commands::ShareEnum(cmd) => {
            log::info!("Building share enumeration request for {}", cmd.server);
            share_enum(cmd)?;
        }
        Commands::Shares(cmd) => {
            log::info!("Listing shares in {:?}", cmd.file);
            shares(cmd)?;
        }
        Commands::BindAck(cmd) => {
            log::info!("Checking bind response in {:?}", cmd.file);
            bind_ack(cmd)?;
        }
    }

    Ok(())
}

fn bind(cmd: &BindCmd) -> Result<(), Box<dyn Error>> {
    let pdu = smb_rpc::build_bind_request_for::<SrvSvc>(&cmd.make_bind_config());
    emit(&pdu, &cmd.output)
}

fn share_enum(cmd: &ShareEnumCmd) -> Result<(), Box<dyn Error>> {
    let pdu = smb_rpc::build_share_enum_request_with(
        &cmd.server,
        cmd.level,
        &cmd.make_request_config(),
    );
    emit(&pdu, &cmd.output)
}

fn shares(cmd: &SharesCmd) -> Result<(), Box<dyn Error>> {
    let data = std::fs::read(&cmd.file)?;
    let shares = if cmd.raw {
        smb_rpc::parse_share_enum_response(&data)?
    } else {
        smb_rpc::parse_share_enum_pdu(&data)?
    };
    for share in &shares {
        println!("{share}");
    }
    log::info!("{} shares", shares.len());
    Ok(())
}

fn bind_ack(cmd: &BindAckCmd) -> Result<(), Box<dyn Error>> {
    let data = std::fs::read(&cmd.file)?;
    let context_id = smb_rpc::check_bind_ack(&data)?;
    println!("Bind accepted, context id {context_id}");
    Ok(())
}

fn emit(pdu: &[u8], output: &OutputArgs) -> Result<(), Box<dyn Error>> {
    match &output.out {
        Some(path) => {
            std::fs::write(path, pdu)?;
            log::info!("Wrote {} bytes to {:?}", pdu.len(), path);
        }
        None => println!("{}", hex_dump(pdu)),
    }
    Ok(())
}
