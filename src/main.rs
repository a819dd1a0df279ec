use anyhow::{Result, anyhow};

use h2h_dashboard::cache::SystemClock;
use h2h_dashboard::career::{PlayerCareerStats, combined_league_record, player_career};
use h2h_dashboard::config::AppConfig;
use h2h_dashboard::division::SectionMarkerClassifier;
use h2h_dashboard::fixtures::canonical_player;
use h2h_dashboard::h2h::{get_h2h, head_to_head_leader_first};
use h2h_dashboard::league::{self, LeagueData, SeasonCache};
use h2h_dashboard::roast::{self, RoastConfig};
use h2h_dashboard::season::SeasonId;
use h2h_dashboard::sheets::WorksheetSource;

const USAGE: &str = "usage: h2h_dashboard [--last N] [--no-cache] \
(--players | --p1 <handle> --p2 <handle> | --profile <handle> [--compare <handle>] | --roast <handle>)";

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{USAGE}");
        return Ok(());
    }

    let cfg = AppConfig::from_env();
    if cfg.seasons.is_empty() {
        return Err(anyhow!(
            "no seasons configured; set SEASON_SHEETS or LOCAL_SHEETS_DIR"
        ));
    }

    let league = load(&cfg, !has_flag(&args, "--no-cache"));
    let league = match arg_value(&args, "--last") {
        Some(raw) => {
            let n = raw
                .parse::<usize>()
                .map_err(|_| anyhow!("--last expects a number, got '{raw}'"))?;
            league.last_seasons(n.max(1))
        }
        None => league,
    };
    let classifier = SectionMarkerClassifier::new(cfg.division_split_season);

    println!("{}", cfg.app_title);
    println!();

    if has_flag(&args, "--players") {
        for player in league.players() {
            println!("{player}");
        }
        return Ok(());
    }

    if let Some(player) = arg_value(&args, "--roast") {
        let player = canonical_player(&player);
        let summary = roast::stats_summary(&player, &league.tables);
        let reply = match roast::roast_player(&RoastConfig::from_env(), &player, &summary) {
            Ok(text) => text,
            Err(err) => format!("[Error contacting OpenRouter: {err:#}]"),
        };
        println!("{reply}");
        return Ok(());
    }

    if let Some(player) = arg_value(&args, "--profile") {
        let stats = player_career(&player, &league.tables, &league.fixtures, &classifier);
        print_profile(&stats);
        if let Some(other) = arg_value(&args, "--compare") {
            println!();
            let other = player_career(&other, &league.tables, &league.fixtures, &classifier);
            print_profile(&other);
            println!();
            print_direct_record(&league, &stats.player, &other.player);
        }
        return Ok(());
    }

    let (Some(p1), Some(p2)) = (arg_value(&args, "--p1"), arg_value(&args, "--p2")) else {
        return Err(anyhow!("{USAGE}"));
    };
    print_head_to_head(&league, &canonical_player(&p1), &canonical_player(&p2));
    Ok(())
}

fn load(cfg: &AppConfig, use_cache: bool) -> LeagueData {
    let sources: Vec<(SeasonId, Box<dyn WorksheetSource>)> = cfg
        .seasons
        .iter()
        .filter_map(|(season, location)| {
            let Some(source) = league::open_source(location, &cfg.sheets_auth) else {
                log::warn!("{season}: unusable sheet location {location:?}");
                return None;
            };
            Some((season.clone(), source))
        })
        .collect();

    let clock = SystemClock;
    let cache_path = (use_cache && cfg.cache_enabled)
        .then(league::default_cache_path)
        .flatten();
    let mut cache = match cache_path.as_deref() {
        Some(path) => SeasonCache::load(path, cfg.cache_ttl),
        None => SeasonCache::new(cfg.cache_ttl),
    };

    let data = league::load_league(
        &sources,
        &cfg.fixture_sheets,
        &mut cache,
        &clock,
        cfg.fetch_parallelism,
    );

    if let Some(path) = cache_path.as_deref() {
        cache.prune(&clock);
        if let Err(err) = cache.save(path) {
            log::warn!("could not persist season cache: {err:#}");
        }
    }
    data
}

fn print_head_to_head(league: &LeagueData, p1: &str, p2: &str) {
    let (left, right, h2h) = head_to_head_leader_first(&league.fixtures, p1, p2);
    println!("Head-to-Head Results");
    println!("{left}  vs  {right}");
    println!(
        "Wins {}  |  Draws {}  |  Losses {}",
        h2h.wins, h2h.draws, h2h.losses
    );
    println!();

    if h2h.matches.is_empty() {
        println!("No head-to-head matches found between these players.");
    } else {
        for m in &h2h.matches {
            let label = match m.round.as_deref() {
                Some(round) => format!("{} {} {round}", m.season, m.competition.label()),
                None => format!("{} {}", m.season, m.competition.label()),
            };
            println!(
                "{label}: {} {}-{} {}",
                m.home, m.home_score, m.away_score, m.away
            );
        }
    }

    println!();
    println!("Combined League Record");
    for (player, totals) in combined_league_record(&league.tables, &[left.as_str(), right.as_str()]) {
        println!(
            "{player}: MP {} | W {} D {} L {} | GF {} GA {} GD {} | Points {}",
            totals.matches_played,
            totals.wins,
            totals.draws,
            totals.losses,
            totals.goals_for,
            totals.goals_against,
            totals.goal_difference,
            totals.points
        );
    }
}

fn print_direct_record(league: &LeagueData, player: &str, other: &str) {
    let h2h = get_h2h(&league.fixtures, player, other);
    println!("Direct Head-to-Head: {player} vs {other}");
    if h2h.matches.is_empty() {
        println!("No head-to-head matches found between these players.");
        return;
    }
    println!(
        "Wins {}  |  Draws {}  |  Losses {}  ({} matches)",
        h2h.wins,
        h2h.draws,
        h2h.losses,
        h2h.matches.len()
    );
}

fn print_profile(stats: &PlayerCareerStats) {
    println!("Player profile: {}", stats.player);
    if !stats.participated() {
        println!("No league seasons found for this player.");
        return;
    }

    let t = &stats.totals;
    println!(
        "Career: MP {} | W {} D {} L {} | GF {} GA {} GD {} | Points {} | Win rate {:.1}%",
        t.matches_played,
        t.wins,
        t.draws,
        t.losses,
        t.goals_for,
        t.goals_against,
        t.goal_difference,
        t.points,
        t.win_rate()
    );
    if let Some(best) = &stats.best_season {
        println!(
            "Best season: {} ({} - Pos: {}, Points: {})",
            best.season,
            best.tier.label(),
            best.position,
            best.stats.points
        );
    }
    if let Some(worst) = &stats.worst_season {
        println!(
            "Worst season: {} ({} - Pos: {}, Points: {})",
            worst.season,
            worst.tier.label(),
            worst.position,
            worst.stats.points
        );
    }
    match &stats.largest_win {
        Some(win) => println!("Biggest win: {} vs {} ({})", win.score(), win.opponent, win.season),
        None => println!("Biggest win: None"),
    }
    match &stats.largest_defeat {
        Some(loss) => println!(
            "Biggest loss: {} vs {} ({})",
            loss.score(),
            loss.opponent,
            loss.season
        ),
        None => println!("Biggest loss: None"),
    }

    println!();
    println!("Season  Division    Pos  MP   W   D   L   GF   GA   GD  Pts");
    for line in &stats.seasons {
        let s = &line.stats;
        println!(
            "{:<7} {:<11} {:>3} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4}",
            line.season.as_str(),
            line.tier.label(),
            line.position,
            s.matches_played,
            s.wins,
            s.draws,
            s.losses,
            s.goals_for,
            s.goals_against,
            s.goal_difference,
            s.points
        );
    }

    println!();
    let trend = stats
        .snapshots
        .iter()
        .map(|(season, snap)| format!("{season}:{}", snap.position))
        .collect::<Vec<_>>()
        .join(" -> ");
    println!("Position trend: {trend}");
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
