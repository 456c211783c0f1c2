// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. clap parses the
// arguments; every action is turned into a controller Request
// and the Response is printed.
//
// A Response::Failed becomes a non-zero exit status for the
// one-shot subcommands. The shell prints it and keeps going.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;
pub mod shell;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, GlobalArgs, ModelSource, PredictArgs, TrainArgs};

use crate::application::{
    config::LabConfig,
    controller::{Controller, Request, Response},
    session::Session,
};

#[derive(Parser, Debug)]
#[command(
    name = "iris-lab",
    version,
    about = "Train, store, load and query an Iris species classifier."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let base = self.global.load_config()?;
        match self.command {
            Commands::Train(args)    => run_train(base, args),
            Commands::Predict(args)  => run_predict(controller(base)?, args),
            Commands::Evaluate(args) => run_evaluate(controller(base)?, args),
            Commands::Status         => run_one(&mut controller(base)?, Request::Status),
            Commands::RemoveLocal    => run_one(&mut controller(base)?, Request::RemoveLocal),
            Commands::Shell          => {
                let mut c = controller(base)?;
                shell::run_shell(&mut c, std::io::stdin().lock(), std::io::stdout())
            }
        }
    }
}

fn controller(cfg: LabConfig) -> Result<Controller> {
    Ok(Controller::new(Session::new(cfg)?))
}

fn run_train(base: LabConfig, args: TrainArgs) -> Result<()> {
    let cfg = args.apply(base);
    tracing::info!(
        "Training for {} epochs (batch {}, lr {}, test_split {})",
        cfg.epochs, cfg.batch_size, cfg.learning_rate, cfg.test_split
    );

    let mut c = controller(cfg)?;
    run_one(&mut c, Request::Train)?;
    if args.save_local {
        run_one(&mut c, Request::SaveLocal)?;
    }
    if let Some(dir) = args.export {
        run_one(&mut c, Request::Export(dir))?;
    }
    Ok(())
}

fn run_predict(mut c: Controller, args: PredictArgs) -> Result<()> {
    load(&mut c, args.source)?;
    run_one(&mut c, Request::Predict(args.features))
}

fn run_evaluate(mut c: Controller, args: EvaluateArgs) -> Result<()> {
    // loading already evaluates on the test split
    let response = c.handle(load_request(args.source));
    finish(response)
}

fn load(c: &mut Controller, source: ModelSource) -> Result<()> {
    let response = c.handle(load_request(source));
    if response.is_failure() {
        anyhow::bail!(response.to_string());
    }
    tracing::info!("Using {:?} model", source);
    Ok(())
}

fn load_request(source: ModelSource) -> Request {
    match source {
        ModelSource::Local  => Request::LoadLocal,
        ModelSource::Remote => Request::LoadRemote,
    }
}

fn run_one(c: &mut Controller, request: Request) -> Result<()> {
    finish(c.handle(request))
}

/// Print a response; a failure ends the command with an error.
fn finish(response: Response) -> Result<()> {
    match response {
        Response::Failed(message) => anyhow::bail!(message),
        response => {
            println!("{response}");
            Ok(())
        }
    }
}
