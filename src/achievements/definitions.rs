//! Achievement definitions and metadata
//!
//! All achievements are defined here with their unlock conditions and point
//! rewards. The closed enum replaces string-keyed dispatch: every award site
//! names a variant, and the catalog table is synced from this list at open.

/// Unique identifier for each achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AchievementSlug {
    // Completion firsts
    FirstLesson,
    FirstProject,

    // Section completion (keyed by stable section slug)
    HtmlFoundations,
    CssFoundations,
    JavascriptBasics,
    PerfectSection,
    CourseCompleted,

    // Habit
    WeekendLearner,
    LearningSpree,

    // Point milestones
    Points100,
    Points500,
    Points1000,

    // Streaks
    Streak3,
    Streak7,
    Streak30,

    // Daily challenges
    FirstDailyChallenge,
    FiveDailyChallenges,

    // Page visits
    LeaderboardVisited,
    AchievementsVisited,
    ResetVisited,
}

impl AchievementSlug {
    /// Stable string form used for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstLesson => "first-lesson-completed",
            Self::FirstProject => "first-project-completed",
            Self::HtmlFoundations => "html-foundations-complete",
            Self::CssFoundations => "css-foundations-complete",
            Self::JavascriptBasics => "javascript-basics-complete",
            Self::PerfectSection => "perfect-section",
            Self::CourseCompleted => "foundations-course-completed",
            Self::WeekendLearner => "weekend-learner",
            Self::LearningSpree => "learning-spree",
            Self::Points100 => "100-points-milestone",
            Self::Points500 => "500-points-milestone",
            Self::Points1000 => "1000-points-milestone",
            Self::Streak3 => "three-day-streak",
            Self::Streak7 => "seven-day-streak",
            Self::Streak30 => "thirty-day-streak",
            Self::FirstDailyChallenge => "first-daily-challenge",
            Self::FiveDailyChallenges => "five-daily-challenges",
            Self::LeaderboardVisited => "leaderboard-visited",
            Self::AchievementsVisited => "achievements-visited",
            Self::ResetVisited => "reset-visited",
        }
    }

    /// Parse from database string
    pub fn from_str(s: &str) -> Option<Self> {
        CATALOG.iter().find(|d| d.slug.as_str() == s).map(|d| d.slug)
    }

    /// Section-completion achievement for a section slug, if one exists
    pub fn for_section(section_slug: &str) -> Option<Self> {
        match section_slug {
            "html-foundations" => Some(Self::HtmlFoundations),
            "css-foundations" => Some(Self::CssFoundations),
            "javascript-basics" => Some(Self::JavascriptBasics),
            _ => None,
        }
    }
}

/// Achievement definition with all metadata
#[derive(Debug, Clone)]
pub struct AchievementDef {
    pub slug: AchievementSlug,
    pub title: &'static str,
    pub description: &'static str,
    pub points_reward: i64,
}

/// All achievement definitions
pub static CATALOG: &[AchievementDef] = &[
    AchievementDef {
        slug: AchievementSlug::FirstLesson,
        title: "First Steps",
        description: "Complete your first lesson",
        points_reward: 10,
    },
    AchievementDef {
        slug: AchievementSlug::FirstProject,
        title: "Builder",
        description: "Complete your first project",
        points_reward: 25,
    },
    AchievementDef {
        slug: AchievementSlug::HtmlFoundations,
        title: "HTML Foundations",
        description: "Complete every lesson in the HTML Foundations section",
        points_reward: 30,
    },
    AchievementDef {
        slug: AchievementSlug::CssFoundations,
        title: "CSS Foundations",
        description: "Complete every lesson in the CSS Foundations section",
        points_reward: 30,
    },
    AchievementDef {
        slug: AchievementSlug::JavascriptBasics,
        title: "JavaScript Basics",
        description: "Complete every lesson in the JavaScript Basics section",
        points_reward: 40,
    },
    AchievementDef {
        slug: AchievementSlug::PerfectSection,
        title: "Perfect Section",
        description: "Complete every lesson in any section",
        points_reward: 20,
    },
    AchievementDef {
        slug: AchievementSlug::CourseCompleted,
        title: "Course Completed",
        description: "Complete every lesson in the course",
        points_reward: 100,
    },
    AchievementDef {
        slug: AchievementSlug::WeekendLearner,
        title: "Weekend Learner",
        description: "Complete a lesson on a Saturday or Sunday",
        points_reward: 10,
    },
    AchievementDef {
        slug: AchievementSlug::LearningSpree,
        title: "Learning Spree",
        description: "Complete 3 lessons in a single day",
        points_reward: 15,
    },
    AchievementDef {
        slug: AchievementSlug::Points100,
        title: "Century",
        description: "Reach 100 total points",
        points_reward: 10,
    },
    AchievementDef {
        slug: AchievementSlug::Points500,
        title: "High Achiever",
        description: "Reach 500 total points",
        points_reward: 25,
    },
    AchievementDef {
        slug: AchievementSlug::Points1000,
        title: "Point Collector",
        description: "Reach 1000 total points",
        points_reward: 50,
    },
    AchievementDef {
        slug: AchievementSlug::Streak3,
        title: "On Fire",
        description: "Maintain a 3-day streak",
        points_reward: 15,
    },
    AchievementDef {
        slug: AchievementSlug::Streak7,
        title: "Week Warrior",
        description: "Maintain a 7-day streak",
        points_reward: 30,
    },
    AchievementDef {
        slug: AchievementSlug::Streak30,
        title: "Monthly Master",
        description: "Maintain a 30-day streak",
        points_reward: 100,
    },
    AchievementDef {
        slug: AchievementSlug::FirstDailyChallenge,
        title: "Challenger",
        description: "Complete your first daily challenge",
        points_reward: 10,
    },
    AchievementDef {
        slug: AchievementSlug::FiveDailyChallenges,
        title: "Challenge Veteran",
        description: "Complete 5 daily challenges",
        points_reward: 25,
    },
    AchievementDef {
        slug: AchievementSlug::LeaderboardVisited,
        title: "Scoping the Competition",
        description: "Visit the leaderboard",
        points_reward: 5,
    },
    AchievementDef {
        slug: AchievementSlug::AchievementsVisited,
        title: "Trophy Room",
        description: "Visit your achievements page",
        points_reward: 5,
    },
    AchievementDef {
        slug: AchievementSlug::ResetVisited,
        title: "Clean Slate",
        description: "Visit the reset page",
        points_reward: 0,
    },
];

impl AchievementDef {
    /// Get achievement definition by slug
    pub fn get(slug: AchievementSlug) -> &'static AchievementDef {
        CATALOG
            .iter()
            .find(|d| d.slug == slug)
            .expect("all achievements are defined")
    }

    pub fn total_count() -> usize {
        CATALOG.len()
    }
}
