use anyhow::Context;
use clap::Parser;
use onboard_guide::config::{presets, toml_config, CliConfig, Command, LogFormat, OnboardConfig};
use onboard_guide::core::progress;
use onboard_guide::core::report;
use onboard_guide::domain::ports::ConfigProvider;
use onboard_guide::utils::error::ErrorSeverity;
use onboard_guide::utils::{logger, validation::Validate};
use onboard_guide::{
    FileSnapshotStore, ModuleCatalog, ModuleStatus, OnboardError, OnboardSession, OnboardState, RuleSet,
};

const DEFAULT_CONFIG_FILE: &str = "onboard.toml";

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    let verbose = cli.verbose || config.logging.verbose;
    match config.logging.format {
        LogFormat::Compact => logger::init_cli_logger(verbose),
        LogFormat::Json => logger::init_json_logger(verbose),
    }
    tracing::debug!("CLI config: {:?}", cli);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    if let Err(e) = run(cli, config).await {
        match e.downcast_ref::<OnboardError>() {
            Some(err) => {
                tracing::error!(
                    "❌ {:#} (Category: {:?}, Severity: {:?})",
                    e,
                    err.category(),
                    err.severity()
                );
                eprintln!("❌ {}", err.user_friendly_message());
                eprintln!("💡 {}", err.recovery_suggestion());

                // 根據錯誤嚴重程度決定退出碼
                let exit_code = match err.severity() {
                    ErrorSeverity::Low | ErrorSeverity::Medium => 2,
                    ErrorSeverity::High => 1,
                    ErrorSeverity::Critical => 3,
                };
                std::process::exit(exit_code);
            }
            None => {
                eprintln!("❌ {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

fn load_config(cli: &CliConfig) -> onboard_guide::Result<OnboardConfig> {
    let mut config = match &cli.config {
        Some(path) => OnboardConfig::from_file(path)?,
        None if std::path::Path::new(DEFAULT_CONFIG_FILE).exists() => {
            OnboardConfig::from_file(DEFAULT_CONFIG_FILE)?
        }
        None => OnboardConfig::default(),
    };

    // 應用命令列覆蓋設定
    if let Some(state) = &cli.state {
        config.storage.snapshot_path = state.clone();
    }
    Ok(config)
}

fn build_session(config: &OnboardConfig) -> anyhow::Result<OnboardSession<FileSnapshotStore>> {
    let catalog = match config.modules_file() {
        Some(path) => ModuleCatalog::from_file(path)
            .with_context(|| format!("loading module catalog from {}", path))?,
        None => ModuleCatalog::builtin()?,
    };
    let rules = match config.rules_file() {
        Some(path) => {
            RuleSet::from_file(path).with_context(|| format!("loading scoring rules from {}", path))?
        }
        None => RuleSet::builtin()?,
    };

    let store = FileSnapshotStore::new(config.snapshot_path());
    Ok(OnboardSession::new(store, catalog, rules))
}

async fn run(cli: CliConfig, config: OnboardConfig) -> anyhow::Result<()> {
    let session = build_session(&config)?;

    match cli.command {
        Command::Presets => {
            for preset in presets::all() {
                println!("{:<14} {}", preset.name, preset.label);
            }
        }
        Command::Recommend {
            answers,
            preset,
            explain,
        } => {
            let answers = match (answers, preset) {
                (Some(path), _) => toml_config::answers_from_file(&path)
                    .with_context(|| format!("reading answers from {}", path))?,
                (None, Some(name)) => presets::find(&name)?.answers,
                (None, None) => anyhow::bail!("either --answers or --preset is required"),
            };

            let state = session.complete_questionnaire(answers).await;
            print_recommendations(&state);

            if explain {
                println!();
                for (module_id, rules) in session.scoring().explain(&state.answers) {
                    println!("  {:<12} {}", module_id, rules.join(", "));
                }
            }
        }
        Command::Status => {
            let Some(state) = require_state(&session).await else {
                return Ok(());
            };
            print_overview(&session, &state);
        }
        Command::Steps { module } => {
            let Some(state) = require_state(&session).await else {
                return Ok(());
            };
            print_steps(&session, &state, &module)?;
        }
        Command::Toggle {
            module,
            step,
            force,
        } => {
            let Some(state) = require_state(&session).await else {
                return Ok(());
            };
            let eligibility = progress::step_eligibility_by_id(session.catalog(), &module, &step, &state)
                .ok_or_else(|| unknown_step(session.catalog(), &module, &step))?;

            if eligibility.locked && !force {
                println!(
                    "🔒 '{}' is locked until its prerequisite module has progress (use --force to override)",
                    step
                );
                return Ok(());
            }

            let state = session.toggle_step(&state, &module, &step).await;
            let status = session
                .status(&state, &module)
                .ok_or_else(|| unknown_step(session.catalog(), &module, &step))?;
            let done = state.is_step_completed(&module, &step);
            println!(
                "{} {}.{}: module is now {}",
                if done { "✅" } else { "↩️" },
                module,
                step,
                status
            );
        }
        Command::Export { output } => {
            let Some(state) = require_state(&session).await else {
                return Ok(());
            };
            let csv = report::to_csv(session.catalog(), &state)?;
            tokio::fs::write(&output, csv)
                .await
                .with_context(|| format!("writing {}", output))?;
            println!("📁 Report saved to: {}", output);
        }
        Command::Reset => {
            session.start_over().await;
            println!("🔄 Onboarding reset. Run `onboard recommend` to start again.");
        }
    }

    Ok(())
}

async fn require_state(session: &OnboardSession<FileSnapshotStore>) -> Option<OnboardState> {
    let state = session.resume().await;
    if state.is_none() {
        println!("No onboarding in progress. Run `onboard recommend --preset retail-store` or pass --answers.");
    }
    state
}

fn unknown_step(catalog: &ModuleCatalog, module: &str, step: &str) -> OnboardError {
    if catalog.contains(module) {
        OnboardError::UnknownStep {
            module_id: module.to_string(),
            step_id: step.to_string(),
        }
    } else {
        OnboardError::UnknownModule {
            module_id: module.to_string(),
        }
    }
}

fn print_recommendations(state: &OnboardState) {
    println!("📋 Recommendations for {}", display_name(state));
    for rec in &state.recommendations {
        println!(
            "  {:>3}  {:<11} {:<12} {}",
            rec.score, rec.relevance, rec.module_id, rec.reason
        );
    }
}

fn print_overview(session: &OnboardSession<FileSnapshotStore>, state: &OnboardState) {
    let overview = session.overview(state);

    println!("🧭 {}: {}% complete", display_name(state), overview.overall_percent);
    for phase in &overview.phases {
        let marker = if phase.is_complete() {
            "✅"
        } else if phase.has_progress() {
            "◐"
        } else {
            "○"
        };
        println!();
        println!("{} Phase {}: {}", marker, phase.number, phase.label);
        for module in &phase.modules {
            println!(
                "    {} {:<20} {}/{}",
                status_icon(module.status),
                module.name,
                module.completed_steps,
                module.total_steps
            );
        }
    }

    if let Some(next) = &overview.next_module {
        println!();
        println!("👉 Next: onboard steps {}", next);
    }
}

fn print_steps(
    session: &OnboardSession<FileSnapshotStore>,
    state: &OnboardState,
    module_id: &str,
) -> onboard_guide::Result<()> {
    let catalog = session.catalog();
    let module = catalog.get(module_id).ok_or_else(|| OnboardError::UnknownModule {
        module_id: module_id.to_string(),
    })?;

    println!(
        "{} {} ({})",
        status_icon(progress::module_status(catalog, module, state)),
        module.name,
        module.description
    );
    for (index, step) in module.steps.iter().enumerate() {
        let eligibility = progress::step_eligibility(catalog, module, index, step, state);
        let check = if eligibility.completed {
            "[x]"
        } else if eligibility.locked {
            "[🔒]"
        } else {
            "[ ]"
        };
        let note = match (&step.prerequisite_module, eligibility.locked, eligibility.unskippable) {
            (Some(required), true, _) => format!("  (needs progress in {})", required),
            (_, _, true) if !eligibility.completed => "  (required to unlock other modules)".to_string(),
            _ => String::new(),
        };
        println!("  {} {:<20} {}{}", check, step.id, step.title, note);
    }
    Ok(())
}

fn status_icon(status: ModuleStatus) -> &'static str {
    match status {
        ModuleStatus::Locked => "🔒",
        ModuleStatus::Ready => "○",
        ModuleStatus::InProgress => "◐",
        ModuleStatus::Complete => "✅",
    }
}

fn display_name(state: &OnboardState) -> &str {
    if state.answers.business_name.is_empty() {
        "your business"
    } else {
        &state.answers.business_name
    }
}
