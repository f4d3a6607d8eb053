use std::io::{self, Write};

use clap::Args;
use corenta::config::AppConfig;
use corenta::error::AppError;
use corenta::workflows::compliance::{
    probe_health, validate_nit, Completion, ComplianceGateway, HttpComplianceGateway, LeadSink,
    ViewController,
};
use tokio::time::{sleep_until, Instant};
use tracing::info;

use crate::render::{
    render_gauge_frame, render_json, render_lead_notice, render_screen, render_sources,
    report_failure,
};

#[derive(Args, Debug)]
pub(crate) struct LookupArgs {
    /// NIT to look up; hyphens and spaces are ignored
    pub(crate) nit: String,
    /// Email address that should receive the full report
    #[arg(long)]
    pub(crate) email: Option<String>,
    /// Print the final screen state as JSON instead of the text report
    #[arg(long)]
    pub(crate) json: bool,
    /// Show the final score immediately instead of animating it
    #[arg(long)]
    pub(crate) no_animation: bool,
}

fn gateway(config: &AppConfig) -> Result<HttpComplianceGateway, AppError> {
    Ok(HttpComplianceGateway::new(
        config.api.base_url.as_str(),
        config.api.request_timeout,
    )?)
}

pub(crate) async fn run_lookup(config: &AppConfig, args: LookupArgs) -> Result<(), AppError> {
    let gateway = gateway(config)?;
    let probe = gateway.clone();
    let mut controller = ViewController::new(gateway);

    info!(base_url = %config.api.base_url, "starting compliance lookup");
    let (_, completion) = tokio::join!(probe_health(&probe), controller.submit(&args.nit));

    let live = !(args.json || args.no_animation);
    if live {
        settle_in_real_time(&mut controller, |controller| controller.is_animating(), true).await?;
    } else {
        settle_instantly(&mut controller, |controller| controller.is_animating());
    }

    match completion {
        Some(Completion::Succeeded(_)) | Some(Completion::Stale) => {}
        Some(Completion::Failed(err)) => {
            return fail(&controller, args.json, err);
        }
        None => {
            return match validate_nit(&args.nit) {
                Err(rejection) => fail(&controller, args.json, rejection),
                Ok(_) => fail(
                    &controller,
                    args.json,
                    io::Error::other("lookup was not dispatched"),
                ),
            };
        }
    }

    if let Some(email) = args.email.as_deref() {
        if let Err(rejection) = controller.submit_lead(email) {
            return fail(&controller, args.json, rejection);
        }
        if live {
            settle_in_real_time(&mut controller, |controller| controller.lead_pending(), false)
                .await?;
        } else {
            settle_instantly(&mut controller, |controller| controller.lead_pending());
        }
    }

    let mut stdout = io::stdout().lock();
    if args.json {
        render_json(&mut stdout, controller.screen())?;
        return Ok(());
    }

    render_screen(&mut stdout, controller.screen())?;
    if let Some(notice) = &controller.lead_view().notice {
        writeln!(stdout)?;
        render_lead_notice(&mut stdout, notice)?;
    }
    Ok(())
}

/// Emits the failed screen once. The banner text travels in the returned
/// error, which `main` prints; JSON mode also writes the screen to stdout.
fn fail<G, S, E>(
    controller: &ViewController<G, S>,
    as_json: bool,
    err: E,
) -> Result<(), AppError>
where
    G: ComplianceGateway,
    S: LeadSink,
    E: Into<AppError>,
{
    report_failure(&mut io::stdout().lock(), controller.screen(), as_json)?;
    Err(err.into())
}

/// Fires the controller's timers against the wall clock while `pending`
/// holds, redrawing the score gauge on each frame when `show_gauge` is set.
async fn settle_in_real_time<G, S>(
    controller: &mut ViewController<G, S>,
    pending: impl Fn(&ViewController<G, S>) -> bool,
    show_gauge: bool,
) -> io::Result<()>
where
    G: ComplianceGateway,
    S: LeadSink,
{
    let origin = Instant::now() - controller.now();
    let mut stderr = io::stderr();
    let show_gauge = show_gauge && pending(controller);
    if show_gauge {
        render_gauge_frame(&mut stderr, controller.screen().score)?;
    }

    while pending(controller) {
        let Some(deadline) = controller.next_deadline() else {
            break;
        };
        sleep_until(origin + deadline).await;
        controller.advance_to(deadline);
        if show_gauge {
            render_gauge_frame(&mut stderr, controller.screen().score)?;
        }
    }
    if show_gauge {
        writeln!(stderr)?;
    }
    Ok(())
}

fn settle_instantly<G, S>(
    controller: &mut ViewController<G, S>,
    pending: impl Fn(&ViewController<G, S>) -> bool,
) where
    G: ComplianceGateway,
    S: LeadSink,
{
    while pending(controller) {
        let Some(deadline) = controller.next_deadline() else {
            break;
        };
        controller.advance_to(deadline);
    }
}

pub(crate) async fn run_health(config: &AppConfig) -> Result<(), AppError> {
    let gateway = gateway(config)?;
    match gateway.health().await {
        Ok(()) => {
            println!("Servicio disponible en {}", gateway.base_url());
            Ok(())
        }
        Err(err) => {
            println!("Servicio no disponible en {}", gateway.base_url());
            Err(err.into())
        }
    }
}

pub(crate) async fn run_sources(config: &AppConfig) -> Result<(), AppError> {
    let gateway = gateway(config)?;
    let sources = gateway.sources().await?;
    render_sources(&mut io::stdout().lock(), &sources)?;
    Ok(())
}
