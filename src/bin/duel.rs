//! Interactive duel
//!
//! Fights one encounter at the console, then settles it and reports the
//! rewards.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use skirmish::actor::{Pet, PetSpecies, Player, Pool};
use skirmish::battle::{
    start_battle, BattleEvent, BattleEventKind, BattlePresenter, BattleStats, LineActions,
    PromptView, SettlementReport,
};
use skirmish::combat::CombatContext;
use skirmish::content::{EnemyCatalog, GameData, QuestLog};
use skirmish::core::types::{EnemyKind, QuestId};
use skirmish::core::CombatConfig;

/// Fight a single turn-based encounter
#[derive(Parser, Debug)]
#[command(name = "duel")]
#[command(about = "Fight one turn-based encounter at the console")]
struct Args {
    /// Enemy kind to fight (see data/enemies.toml)
    #[arg(long, default_value = "wolf")]
    enemy: String,

    /// Random seed for a reproducible battle
    #[arg(long)]
    seed: Option<u64>,

    /// Directory holding items.toml, skills.toml, enemies.toml and combat.toml
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Combat config file; overrides <data-dir>/combat.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Player name
    #[arg(long, default_value = "Hero")]
    name: String,

    /// Bring a pet (wolf_pup, drake, hawk, bear_cub, cat)
    #[arg(long)]
    pet: Option<String>,

    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct DuelSummary {
    seed: u64,
    stats: BattleStats,
    report: SettlementReport,
    quests_completed: Vec<QuestId>,
    gold: u32,
}

/// Renders battle events as plain text
struct ConsolePresenter;

impl BattlePresenter for ConsolePresenter {
    fn present(&mut self, event: &BattleEvent) {
        match &event.kind {
            BattleEventKind::TurnStarted => println!("\n=== Turn {} ===", event.turn),
            BattleEventKind::ActionRejected { .. } => println!("  ! {}", event.description),
            BattleEventKind::BattleEnded { .. } => println!("\n{}", event.description),
            _ => println!("  {}", event.description),
        }
    }

    fn prompt(&mut self, view: &PromptView) {
        if let Err(e) = render_prompt(view) {
            tracing::warn!(error = %e, "failed to write prompt");
        }
    }
}

fn render_prompt(view: &PromptView) -> io::Result<()> {
    println!(
        "{:<16} HP {} MP {}",
        view.player.name,
        bar(&view.player.health),
        bar(&view.player.mana)
    );
    println!("{:<16} HP {}", view.enemy.name, bar(&view.enemy.health));
    for effect in &view.player_effects {
        println!("  you: {} ({} turns)", effect.kind.label(), effect.remaining);
    }
    for effect in &view.enemy_effects {
        println!("  foe: {} ({} turns)", effect.kind.label(), effect.remaining);
    }

    let items: Vec<String> = view
        .items
        .iter()
        .map(|s| format!("{} x{}", s.item, s.count))
        .collect();
    let skills: Vec<&str> = view.skills.iter().map(|s| s.as_str()).collect();
    println!(
        "1) attack  2) flee  3 <item>) [{}]  4 <skill>) [{}]",
        items.join(", "),
        skills.join(", ")
    );
    print!("> ");
    io::stdout().flush()?;
    Ok(())
}

fn bar(pool: &Pool) -> String {
    const WIDTH: usize = 20;
    let filled = (pool.ratio() * WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {}/{}",
        "#".repeat(filled),
        "-".repeat(WIDTH - filled.min(WIDTH)),
        pool.current(),
        pool.max()
    )
}

fn load_config(args: &Args) -> Result<CombatConfig, Box<dyn std::error::Error>> {
    if let Some(path) = &args.config {
        return Ok(CombatConfig::load(path)?);
    }
    let default_path = args.data_dir.join("combat.toml");
    match CombatConfig::load(&default_path) {
        Ok(config) => Ok(config),
        Err(e) => {
            tracing::warn!(
                path = %default_path.display(),
                error = %e,
                "using default combat config"
            );
            Ok(CombatConfig::default())
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args)?;
    let data = GameData::load_dir(&args.data_dir).unwrap_or_else(|e| {
        tracing::warn!(dir = %args.data_dir.display(), error = %e, "using built-in game data");
        GameData::standard()
    });

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    tracing::info!(seed, enemy = %args.enemy, "duel starting");

    let mut player = Player::new(args.name.clone());
    if let Some(label) = &args.pet {
        let species = PetSpecies::from_label(label)
            .ok_or_else(|| format!("unknown pet species '{}'", label))?;
        player.pet = Some(Pet::new(species.label(), species));
    }

    let enemy = data.enemies.spawn(&EnemyKind::new(args.enemy.clone()))?;
    let ctx = CombatContext::new(&config, &data.items, &data.skills);
    let mut quests = QuestLog::standard();

    let (report, stats) = {
        let mut session = start_battle(&mut player, enemy, ctx, &mut rng)?;
        let stdin = io::stdin();
        let mut source = LineActions::new(stdin.lock());
        session.run(&mut source, &mut ConsolePresenter)?;
        let report = session.settle(&quests)?.clone();
        (report, session.get_battle_stats())
    };

    let quests_completed = quests.apply(&report.quest_deltas);
    for quest in &quests_completed {
        if let Some(objective) = quests.get(quest) {
            player.gold += objective.reward;
            tracing::info!(quest = %quest, reward = objective.reward, "quest completed");
        }
    }

    if args.json {
        let summary = DuelSummary {
            seed,
            stats,
            report,
            quests_completed,
            gold: player.gold,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("\n--- Settlement (seed {}) ---", seed);
    println!("Turns: {}", stats.turns);
    println!("Experience: +{}  Gold: +{}", report.experience_gained, report.gold_gained);
    if report.leveled_up {
        println!("Level up! Now level {}", report.new_level);
    }
    for skill in &report.skills_unlocked {
        println!("Learned {}", skill);
    }
    for item in &report.loot_awarded {
        println!("Found {}", item);
    }
    if report.pet_experience_gained > 0 {
        println!("Pet experience: +{}", report.pet_experience_gained);
    }
    for quest in &quests_completed {
        if let Some(objective) = quests.get(quest) {
            println!("Quest complete: {} (+{} gold)", objective.title, objective.reward);
        }
    }
    println!("Gold total: {}", player.gold);
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("skirmish=info")),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
