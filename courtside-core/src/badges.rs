use courtside_types::{Badge, BadgeKind, GameStats};

use crate::StatEngine;

struct BadgeRule {
    kind: BadgeKind,
    label: &'static str,
    description: &'static str,
    icon: &'static str,
    applies: fn(&GameStats) -> bool,
}

// Order here is display order.
const RULES: [BadgeRule; 7] = [
    BadgeRule {
        kind: BadgeKind::Sniper,
        label: "Sniper",
        description: "True shooting of 60% or better with at least 8 points",
        icon: "target",
        applies: |stats| {
            StatEngine::true_shooting_percentage(stats) >= 60 && StatEngine::total_points(stats) >= 8
        },
    },
    BadgeRule {
        kind: BadgeKind::TheWall,
        label: "The Wall",
        description: "2 or more blocks",
        icon: "shield",
        applies: |stats| stats.blocks >= 2,
    },
    BadgeRule {
        kind: BadgeKind::Pickpocket,
        label: "Pickpocket",
        description: "4 or more steals",
        icon: "hand",
        applies: |stats| stats.steals >= 4,
    },
    BadgeRule {
        kind: BadgeKind::Maestro,
        label: "Maestro",
        description: "5 or more assists",
        icon: "sparkles",
        applies: |stats| stats.assists >= 5,
    },
    BadgeRule {
        kind: BadgeKind::Cleaner,
        label: "Cleaner",
        description: "8 or more rebounds",
        icon: "broom",
        applies: |stats| StatEngine::total_rebounds(stats) >= 8,
    },
    BadgeRule {
        kind: BadgeKind::MvpPerf,
        label: "MVP Perf",
        description: "Evaluation of 15 or more",
        icon: "crown",
        applies: |stats| StatEngine::evaluation(stats) >= 15,
    },
    BadgeRule {
        kind: BadgeKind::Energizer,
        label: "Energizer",
        description: "No turnovers with at least 4 points",
        icon: "zap",
        applies: |stats| stats.turnovers == 0 && StatEngine::total_points(stats) >= 4,
    },
];

pub struct BadgeEvaluator;

impl BadgeEvaluator {
    /// Every rule is checked independently; several badges can fire at once.
    pub fn evaluate(stats: &GameStats) -> Vec<Badge> {
        RULES
            .iter()
            .filter(|rule| (rule.applies)(stats))
            .map(|rule| Badge {
                kind: rule.kind,
                label: rule.label.to_string(),
                description: rule.description.to_string(),
                icon: rule.icon.to_string(),
            })
            .collect()
    }

    pub fn kinds(stats: &GameStats) -> Vec<BadgeKind> {
        Self::evaluate(stats).into_iter().map(|badge| badge.kind).collect()
    }
}
