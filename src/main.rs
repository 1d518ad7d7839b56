use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use uuid::Uuid;

use vibe_site::config::Config;
use vibe_site::credentials::{Chain, EnvCredentials, KeyFile};
use vibe_site::session::Session;
use vibe_site::{log, IsolationPolicy, Requester, RequestError, SiteGenerator};

mod cli;
mod ux;

use cli::{Args, Command};

fn build_config(args: &Args) -> Result<Config> {
    let mut cfg = match &args.config {
        Some(path) => Config::load(Path::new(path))?,
        None => Config::default(),
    };
    if let Some(p) = args.provider {
        cfg.set_provider(p);
    }
    if let Some(m) = &args.model {
        cfg.model = m.clone();
    }
    if let Some(s) = &args.session {
        cfg.session_dir = s.clone();
    }
    if let Some(t) = args.timeout_secs {
        cfg.timeout_secs = t;
    }
    if let Some(k) = &args.key_file {
        cfg.key_file = Some(k.clone());
    }
    if args.no_artifacts {
        cfg.save_artifacts = false;
    }
    Ok(cfg)
}

fn build_generator(cfg: &Config) -> Result<SiteGenerator> {
    let mut creds = Chain::new().with(EnvCredentials);
    if let Some(path) = &cfg.key_file {
        let kf = KeyFile::load(Path::new(path)).with_context(|| format!("reading key file {path}"))?;
        creds = creds.with(kf);
    }
    Ok(SiteGenerator::new(Requester::from_config(cfg, Arc::new(creds))))
}

struct App {
    cfg: Config,
    generator: SiteGenerator,
    session: Session,
    policy: IsolationPolicy,
    tx: Uuid,
    auto_approve: bool,
}

impl App {
    fn save_stage<I: serde::Serialize, O: serde::Serialize>(&self, stage: &str, input: &I, output: &O) -> Result<()> {
        if self.cfg.save_artifacts {
            log::save_stage(self.session.root(), self.tx, stage, input, output)?;
        }
        Ok(())
    }

    async fn plan(&self, idea: &str) -> Result<String> {
        let pb = ux::spinner("Planning...");
        let plan = self.generator.generate_plan(idea).await;
        pb.finish_and_clear();
        let plan = plan?;

        self.save_stage("plan", &json!({ "idea": idea }), &plan)?;
        self.session.save_plan(&plan)?;
        ux::show_plan(&plan);
        Ok(plan)
    }

    async fn generate(&self, idea: Option<&str>) -> Result<()> {
        let plan = match idea {
            Some(idea) => {
                let plan = self.plan(idea).await?;
                if !self.auto_approve && !ux::confirm("Generate the site from this plan?") {
                    println!("Aborted by user. The plan is saved; run `generate` to use it.");
                    return Ok(());
                }
                plan
            }
            None => self.session.load_plan()?,
        };

        let pb = ux::spinner("Generating code...");
        let ex = self.generator.generate_code_traced(&plan).await;
        pb.finish_and_clear();
        let ex = ex?;

        self.save_stage("codegen", &json!({ "plan": plan }), &json!({ "source": ex.source, "bundle": ex.bundle }))?;
        ux::print_extraction(&ex);
        self.commit(&ex.bundle)
    }

    async fn edit(&self, instruction: &str) -> Result<()> {
        let current = self.session.load_bundle()?;

        let pb = ux::spinner("Editing code...");
        let ex = self.generator.edit_code_traced(&current, instruction).await;
        pb.finish_and_clear();
        let ex = ex?;

        self.save_stage(
            "edit",
            &json!({ "instruction": instruction, "bundle": current }),
            &json!({ "source": ex.source, "bundle": ex.bundle }),
        )?;
        ux::print_extraction(&ex);
        self.commit(&ex.bundle)
    }

    fn commit(&self, bundle: &vibe_site::CodeBundle) -> Result<()> {
        self.session.save_bundle(bundle)?;
        let preview = self.session.write_preview(bundle, &self.policy)?;
        ux::print_saved(self.session.root(), &preview);
        Ok(())
    }

    fn preview(&self) -> Result<()> {
        let bundle = self.session.load_bundle()?;
        let preview = self.session.write_preview(&bundle, &self.policy)?;
        ux::print_saved(self.session.root(), &preview);
        Ok(())
    }

    fn undo(&self) -> Result<()> {
        match self.session.undo()? {
            Some(bundle) => {
                let preview = self.session.write_preview(&bundle, &self.policy)?;
                println!("Restored previous version.");
                ux::print_saved(self.session.root(), &preview);
            }
            None => println!("Nothing to undo."),
        }
        Ok(())
    }
}

async fn run(args: Args) -> Result<()> {
    let cfg = build_config(&args)?;
    let generator = build_generator(&cfg)?;
    let session = Session::open(&cfg.session_dir)?;
    let app = App {
        generator,
        session,
        policy: IsolationPolicy::default(),
        tx: Uuid::new_v4(),
        auto_approve: args.auto_approve,
        cfg,
    };
    tracing::debug!(tx = %app.tx, provider = ?app.cfg.provider, model = %app.cfg.model, "starting");

    match &args.command {
        Command::Plan { idea } => app.plan(idea).await.map(|_| ()),
        Command::Generate { idea } => app.generate(idea.as_deref()).await,
        Command::Edit { instruction } => app.edit(instruction).await,
        Command::Preview => app.preview(),
        Command::Undo => app.undo(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    log::init_tracing(args.debug);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<RequestError>() {
                Some(req) => ux::print_request_error(req),
                None => eprintln!("error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
