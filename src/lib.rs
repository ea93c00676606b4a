// src/lib.rs

pub mod capacity;
pub mod cli;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod errors;
pub mod graph;
pub mod logging;
pub mod model;
pub mod sla;
pub mod store;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::{CliArgs, Command, JobArgs};
use crate::clock::SystemClock;
use crate::config::{ShopFile, load_and_validate};
use crate::dispatch::{Dispatcher, InlineDispatcher, QueuedDispatcher};
use crate::engine::{ReconcileRuntime, RuntimeEvent, RuntimeOptions, WorkItemService};
use crate::graph::DependencyGraph;
use crate::model::{Actor, WorkItem};
use crate::sla::{JobContext, PolicyRegistry, assess};
use crate::store::{MemoryStore, WorkItemStore};
use crate::types::{DispatchMode, WorkItemStatus};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - shop file loading and validation
/// - the in-memory store seeded from it
/// - the work item service with the configured dispatcher
/// - the SLA policy registry
/// - the reconcile runtime and Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let shop = load_and_validate(&config_path)?;
    let actor = Actor::new(args.actor.as_str());

    match args.command {
        Command::Check => {
            print_check(&shop)?;
        }
        Command::Forecast { item, detail } => {
            let session = Session::open(&shop)?;
            let fc = session.service.forecast_detail(&item)?;
            println!(
                "{item}: projected completion {}, utilization {:.2}%, risk {}",
                fc.snapshot.projected_completion, fc.snapshot.utilization_pct, fc.snapshot.risk
            );
            if detail {
                for day in &fc.allocations {
                    println!(
                        "  {}  from {}  used {} of {} min",
                        day.date,
                        day.anchor.time().format("%H:%M"),
                        day.consumed_minutes,
                        day.available_minutes
                    );
                }
                if fc.calendar_exhausted() {
                    println!(
                        "  lookahead exhausted; {} min extrapolated past the calendar",
                        fc.overflow_minutes
                    );
                }
            }
        }
        Command::Transition { item, status } => {
            let target: WorkItemStatus = status.parse().map_err(anyhow::Error::msg)?;
            let session = Session::open(&shop)?;
            let updated = session.service.transition(&item, target, &actor)?;
            session.settle().await;
            print_item_outcome(&session, &updated)?;
        }
        Command::Progress { item, value } => {
            let session = Session::open(&shop)?;
            let updated = session.service.update_progress(&item, value, &actor)?;
            session.settle().await;
            print_item_outcome(&session, &updated)?;
        }
        Command::Reconcile { once } => {
            let session = Session::open(&shop)?;
            run_reconcile(&shop, &session, once).await?;
        }
        Command::Resolve(job) => {
            let session = Session::open(&shop)?;
            let ctx = job_context(&job);
            match session.registry.resolve_rule(&ctx)? {
                Some(resolved) => println!(
                    "{} [{}] {} -> {}: policy '{}', turnaround {}h",
                    ctx.service_type,
                    ctx.workshop.as_deref().unwrap_or("any workshop"),
                    ctx.start_event,
                    ctx.stop_event,
                    resolved.policy.name,
                    resolved.turnaround_hours()
                ),
                None => println!("no SLA rule matches {}", ctx.service_type),
            }
        }
        Command::Assess { job, elapsed_minutes } => {
            let session = Session::open(&shop)?;
            let ctx = job_context(&job);
            let Some(resolved) = session.registry.resolve_rule(&ctx)? else {
                bail!("no SLA rule matches service '{}'", ctx.service_type);
            };
            let a = assess(&resolved.policy, &resolved.rule, elapsed_minutes);
            println!(
                "{}: {} ({:.1}% of {} min, policy '{}', escalation level {})",
                ctx.service_type,
                a.status,
                a.consumed_pct,
                a.target_minutes,
                resolved.policy.name,
                a.escalation_level
            );
        }
    }

    Ok(())
}

/// Everything a command needs, built over one in-memory store.
struct Session {
    store: MemoryStore,
    service: WorkItemService,
    registry: PolicyRegistry,
    queued: Option<QueuedDispatcher>,
}

impl Session {
    fn open(shop: &ShopFile) -> Result<Self> {
        let store = shop.build_store()?;
        let items: Arc<dyn WorkItemStore> = Arc::new(store.clone());

        let (dispatcher, queued): (Arc<dyn Dispatcher>, Option<QueuedDispatcher>) =
            match shop.config.dispatch_mode {
                DispatchMode::Inline => (Arc::new(InlineDispatcher::new(Arc::clone(&items))), None),
                DispatchMode::Queued => {
                    let (q, _worker) = QueuedDispatcher::spawn(Arc::clone(&items), shop.config.queue_length);
                    (Arc::new(q.clone()), Some(q))
                }
            };
        debug!(mode = ?shop.config.dispatch_mode, "roll-up dispatcher ready");

        let service = WorkItemService::new(
            items,
            Arc::new(store.clone()),
            dispatcher,
            Arc::new(SystemClock),
            shop.allocator_settings(),
        );
        let registry = PolicyRegistry::new(Arc::new(store.clone()));

        Ok(Self {
            store,
            service,
            registry,
            queued,
        })
    }

    /// Wait for queued roll-ups so the printed state is final.
    async fn settle(&self) {
        if let Some(q) = &self.queued {
            q.flush().await;
        }
    }
}

async fn run_reconcile(shop: &ShopFile, session: &Session, once: bool) -> Result<()> {
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(8);

    // Ctrl-C → graceful shutdown.
    if !once {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let options = RuntimeOptions {
        interval: shop.reconcile_interval(),
        exit_after_first_pass: once,
    };
    let runtime = ReconcileRuntime::new(session.service.reconciler().clone(), rt_rx, options);
    let summary = runtime.run().await?;
    drop(rt_tx);

    info!(passes = summary.passes, "reconcile finished");
    if let Some(report) = summary.last_report {
        println!("updated {} open item(s)", report.updated);
        for (id, reason) in &report.failed {
            println!("  failed {id}: {reason}");
        }
    }
    for item in session.store.list_open_work_items()? {
        if let Some(snap) = &item.snapshot {
            println!(
                "  {}: {} ({:.2}%, {})",
                item.id, snap.projected_completion, snap.utilization_pct, snap.risk
            );
        }
    }
    Ok(())
}

fn job_context(job: &JobArgs) -> JobContext {
    JobContext::new(
        job.service_type.as_str(),
        job.workshop.as_deref(),
        job.start_event.as_str(),
        job.stop_event.as_str(),
    )
}

fn print_item_outcome(session: &Session, item: &WorkItem) -> Result<()> {
    println!(
        "{}: {} at {:.2}% (by {})",
        item.id,
        item.status,
        item.progress,
        item.modified_by.as_deref().unwrap_or("-")
    );

    let mut parent = item.parent.clone();
    while let Some(id) = parent {
        let p = session.store.get_work_item(&id)?;
        println!("  parent {}: {} at {:.2}%", p.id, p.status, p.progress);
        parent = p.parent;
    }
    Ok(())
}

/// Validation summary: config, resources, items in dependency order,
/// policies.
fn print_check(shop: &ShopFile) -> Result<()> {
    println!("shopsched check");
    println!("  config.lookahead_days = {}", shop.config.lookahead_days);
    println!("  config.workday_start = {}", shop.config.workday_start);
    println!("  config.dispatch_mode = {:?}", shop.config.dispatch_mode);
    println!(
        "  config.reconcile_interval_secs = {}",
        shop.config.reconcile_interval_secs
    );
    println!();

    println!("resources ({}):", shop.resources().len());
    for res in shop.resources() {
        let days = shop
            .availability()
            .iter()
            .filter(|(r, _, _)| r == &res.id)
            .count();
        println!(
            "  - {}{} ({days} calendar day(s))",
            res.id,
            res.name
                .as_deref()
                .map(|n| format!(" \"{n}\""))
                .unwrap_or_default()
        );
    }

    let graph = DependencyGraph::from_items(shop.items());
    let order = graph.topological_order()?;
    println!("items ({}), dependency order:", order.len());
    for id in &order {
        let preds = graph.predecessors_of(id);
        if preds.is_empty() {
            println!("  - {id}");
        } else {
            println!("  - {id} (after {})", preds.join(", "));
        }
    }

    println!("policies ({}):", shop.policies().len());
    for policy in shop.policies() {
        let mut flags = Vec::new();
        if policy.is_default {
            flags.push("default");
        }
        if !policy.enabled {
            flags.push("disabled");
        }
        if policy.apply_per_workshop {
            flags.push("per-workshop");
        }
        println!(
            "  - {} ({} rule(s)){}",
            policy.name,
            policy.rules.len(),
            if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            }
        );
    }

    debug!("check complete (nothing changed)");
    Ok(())
}
