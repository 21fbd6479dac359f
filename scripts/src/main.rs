use clap::Parser;
use scripts::{
    cli::Cli, errors::ScriptError, toolkit::AlloyToolkit, utils::setup_client,
    verify::ForgeVerifier,
};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    // A missing `.env` file is fine, everything can come from the CLI
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    tracing_subscriber::fmt().pretty().init();

    cli.command.validate()?;

    let network = cli.network_config();
    let deployments_path = cli.deployments_path();
    let Cli {
        priv_key,
        rpc_url,
        artifacts_dir,
        contracts_dir,
        implementation_contract,
        etherscan_api_key,
        command,
        ..
    } = cli;

    let (client, deployer) = setup_client(&priv_key, &rpc_url).await?;
    let toolkit = AlloyToolkit::new(client, deployer, artifacts_dir, deployments_path);
    let verifier = ForgeVerifier::new(
        contracts_dir,
        rpc_url,
        implementation_contract,
        etherscan_api_key,
    );

    let proxy = command.run(&toolkit, &verifier, &network).await?;
    println!("{proxy:#x}");

    Ok(())
}
