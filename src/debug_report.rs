use boxscore::{ClassificationDetails, ErrorRecord, Payload, QueryPlan, ResultRecord};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const RED: &str = "\x1b[31m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_classification(question: &str, plan: &QueryPlan, details: &ClassificationDetails, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Classifying: \"{}\"", question), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Cues ━━━", ansi::GRAY));
    print_cues(details, &palette);

    println!("\n{}", palette.paint("━━━ Plan ━━━", ansi::GRAY));
    print_plan(plan, details, &palette);

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Rules evaluated: {}  │  Skipped: {}",
        palette.paint(format!("{:?}", details.elapsed), ansi::GREEN),
        palette.paint(details.rules_evaluated.to_string(), ansi::CYAN),
        palette.dim(details.rules_skipped.to_string()),
    );
    println!();
}

fn print_cues(details: &ClassificationDetails, palette: &ansi::Palette) {
    if details.cues.is_empty() {
        println!("  {}", palette.dim("No cues fired; only unconditional rules ran"));
    } else {
        let names: Vec<&str> = details.cues.iter_names().map(|(name, _)| name).collect();
        println!("  {} {}", palette.paint("cues:", ansi::BLUE), palette.paint(names.join(" | "), ansi::YELLOW));
    }
    if !details.phrases.is_empty() {
        println!("  {} {}", palette.paint("phrases:", ansi::BLUE), palette.dim(details.phrases.join(", ")));
    }
    if !details.teams_detected.is_empty() {
        println!("  {} {}", palette.paint("teams:", ansi::BLUE), details.teams_detected.join(", "));
    }
    if let Some(week) = details.week {
        println!("  {} {}", palette.paint("week:", ansi::BLUE), week);
    }
}

fn print_plan(plan: &QueryPlan, details: &ClassificationDetails, palette: &ansi::Palette) {
    println!(
        "  {} {} {} {}",
        palette.bold(palette.paint(plan.query_type.as_str(), ansi::GREEN)),
        palette.dim("│ format:"),
        palette.paint(plan.response_format.as_str(), ansi::BLUE),
        palette.dim(format!("│ rule: {}", details.matched_rule)),
    );
    print_list("players", &plan.primary_entities, palette);
    print_list("teams", &plan.secondary_entities, palette);
    print_list("metrics", &plan.metrics, palette);
    let seasons: Vec<String> = plan.filters.seasons.iter().map(i32::to_string).collect();
    print_list("seasons", &seasons, palette);
    if let Some(aggregation) = plan.aggregation {
        println!("  {} {:?}", palette.dim("aggregation:"), aggregation);
    }
    if let Some(limit) = plan.filters.limit {
        println!("  {} {}", palette.dim("limit:"), limit);
    }
    if let Ok(context) = serde_json::to_string(&plan.filters.context) {
        if context != "{}" {
            println!("  {} {}", palette.dim("context:"), palette.paint(context, ansi::YELLOW));
        }
    }
    for (idx, step) in plan.processing_steps.iter().enumerate() {
        println!("    {} {}", palette.paint(format!("{}.", idx + 1), ansi::GRAY), step);
    }
}

fn print_list(label: &str, items: &[String], palette: &ansi::Palette) {
    if !items.is_empty() {
        println!("  {} {}", palette.dim(format!("{label}:")), items.join(", "));
    }
}

pub fn print_record(record: &ResultRecord, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("{}", palette.paint("━━━ Result ━━━", ansi::GRAY));

    match &record.payload {
        Payload::EntityStats(line) => {
            println!("  {}", palette.bold(&line.entity));
            for (metric, value) in &line.stats {
                println!("    {} {}", palette.paint(metric, ansi::BLUE), num(*value));
            }
        }
        Payload::Comparison { comparison, .. } => {
            for metric in &comparison.by_metric {
                println!("  {}", palette.paint(&metric.metric, ansi::BLUE));
                for row in &metric.rankings {
                    println!("    {} {} {}", palette.dim(format!("{}.", row.rank)), row.entity, num(row.value));
                }
            }
            if let Some(overall) = &comparison.overall {
                println!("  {}", palette.bold("overall"));
                for row in overall {
                    println!("    {} {} {}", palette.dim(format!("{}.", row.rank)), row.entity, row.score);
                }
            }
        }
        Payload::Seasons(seasons) => {
            println!("  {}", palette.bold(&seasons.entity));
            for metric in &seasons.by_metric {
                let trend = metric
                    .trend
                    .as_ref()
                    .map(|t| format!("{:+} ({:?})", t.change, t.direction))
                    .unwrap_or_default();
                println!(
                    "    {} best {} ({})  worst {} ({})  {}",
                    palette.paint(&metric.metric, ansi::BLUE),
                    metric.best_season,
                    num(metric.best_value),
                    metric.worst_season,
                    num(metric.worst_value),
                    palette.dim(trend),
                );
            }
        }
        Payload::Leaders(board) => {
            println!("  {} {}", palette.bold(&board.metric), palette.dim(format!("of {}", board.total_entities)));
            for row in &board.leaders {
                let team = row.team.as_deref().map(|t| format!(" ({t})")).unwrap_or_default();
                println!("    {} {}{} {}", palette.dim(format!("{}.", row.rank)), row.entity, team, num(row.value));
            }
        }
        Payload::Ranking { entity, ranks } => {
            println!("  {}", palette.bold(entity));
            for rank in ranks {
                let place = rank.rank.map(|r| format!("#{r}")).unwrap_or_else(|| "unranked".to_string());
                println!(
                    "    {} {} {} {}",
                    palette.paint(&rank.metric, ansi::BLUE),
                    num(rank.value),
                    palette.paint(place, ansi::GREEN),
                    palette.dim(format!("of {}", rank.total_entities)),
                );
            }
        }
        Payload::Aggregate(agg) => {
            for metric in &agg.metrics {
                println!(
                    "  {} {} {}",
                    palette.paint(&metric.metric, ansi::BLUE),
                    num(metric.value),
                    palette.dim(format!("{:?} over {}", agg.aggregation, metric.count)),
                );
            }
        }
        Payload::Threshold(result) => {
            println!(
                "  {} {:?} {}  {}",
                palette.paint(&result.metric, ansi::BLUE),
                result.comparator,
                num(result.threshold),
                palette.dim(format!("{} matches", result.matches.len())),
            );
            for row in &result.matches {
                println!("    {} {} {}", palette.dim(format!("{}.", row.rank)), row.entity, num(row.value));
            }
        }
        Payload::Games { entity, games } => {
            println!("  {}", palette.bold(entity));
            for game in games {
                let week = game.week.map(|w| format!("week {w} ")).unwrap_or_default();
                println!("    {}{} {}", palette.dim(week), game.opponent, palette.dim(&game.game_id));
                for (metric, value) in &game.stats {
                    println!("      {} {}", palette.paint(metric, ansi::BLUE), num(*value));
                }
            }
        }
        Payload::Contextual(breakdown) => {
            println!("  {}", palette.bold(&breakdown.entity));
            for bucket in &breakdown.buckets {
                println!(
                    "    {} {} {}",
                    palette.paint(&bucket.context, ansi::BLUE),
                    palette.dim(format!("{}-{}-{}", bucket.wins, bucket.losses, bucket.ties)),
                    palette.dim(format!("{} games", bucket.games)),
                );
                for (metric, value) in &bucket.averages {
                    println!("      {} {}", metric, num(*value));
                }
            }
        }
        Payload::GameRanking(ranked) => {
            println!("  {} {}", palette.bold(&ranked.entity), palette.paint(&ranked.metric, ansi::BLUE));
            for game in &ranked.games {
                println!(
                    "    {} {} {} {}",
                    palette.dim(format!("{}.", game.rank)),
                    game.opponent,
                    num(game.value),
                    palette.dim(&game.game_id)
                );
            }
            println!("  {} {}", palette.dim("average:"), num(ranked.average));
        }
    }

    for (key, reason) in &record.errors {
        println!("  {} {} {}", palette.paint("✗", ansi::RED), key, palette.dim(reason));
    }
    println!();
}

pub fn print_error(err: &ErrorRecord, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("{}", palette.paint("━━━ Error ━━━", ansi::GRAY));
    println!("  {}", palette.bold(palette.paint(err.to_string(), ansi::RED)));
    for (key, reason) in &err.errors {
        println!("    {} {}", key, palette.dim(reason));
    }
    println!();
}

/// Whole numbers print without a fractional part.
fn num(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 { format!("{value:.0}") } else { format!("{value:.2}") }
}
