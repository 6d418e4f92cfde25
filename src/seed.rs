//! Course catalog seeding
//!
//! Loads the Foundations course (sections, lessons) and a starter set of
//! daily challenges. Safe to run repeatedly: sections upsert on slug,
//! lessons on their position within the section.

use rusqlite::Connection;
use tracing::info;

use crate::error::Result;
use crate::models::{ChallengeKind, LessonKind};

struct SectionSeed {
    slug: &'static str,
    title: &'static str,
    lessons: &'static [LessonSeed],
}

struct LessonSeed {
    title: &'static str,
    points: i64,
    kind: LessonKind,
    url: &'static str,
}

const fn lesson(title: &'static str, points: i64, url: &'static str) -> LessonSeed {
    LessonSeed {
        title,
        points,
        kind: LessonKind::Lesson,
        url,
    }
}

const fn project(title: &'static str, points: i64, url: &'static str) -> LessonSeed {
    LessonSeed {
        title,
        points,
        kind: LessonKind::Project,
        url,
    }
}

const FOUNDATIONS: &[SectionSeed] = &[
    SectionSeed {
        slug: "introduction",
        title: "Introduction",
        lessons: &[
            lesson("How This Course Will Work", 10, "https://www.theodinproject.com/lessons/foundations-how-this-course-will-work"),
            lesson("Introduction to Web Development", 10, "https://www.theodinproject.com/lessons/foundations-introduction-to-web-development"),
            lesson("Motivation and Mindset", 5, "https://www.theodinproject.com/lessons/foundations-motivation-and-mindset"),
            lesson("Asking For Help", 5, "https://www.theodinproject.com/lessons/foundations-asking-for-help"),
            lesson("Join the Odin Community", 5, "https://www.theodinproject.com/lessons/foundations-join-the-odin-community"),
        ],
    },
    SectionSeed {
        slug: "prerequisites",
        title: "Prerequisites",
        lessons: &[
            lesson("Computer Basics", 10, "https://www.theodinproject.com/lessons/foundations-computer-basics"),
            lesson("How Does the Web Work?", 15, "https://www.theodinproject.com/lessons/foundations-how-does-the-web-work"),
            lesson("Installation Overview", 5, "https://www.theodinproject.com/lessons/foundations-installation-overview"),
            lesson("Installations", 20, "https://www.theodinproject.com/lessons/foundations-installations"),
            lesson("Text Editors", 10, "https://www.theodinproject.com/lessons/foundations-text-editors"),
            lesson("Command Line Basics", 15, "https://www.theodinproject.com/lessons/foundations-command-line-basics"),
            lesson("Setting up Git", 15, "https://www.theodinproject.com/lessons/foundations-setting-up-git"),
        ],
    },
    SectionSeed {
        slug: "git-basics",
        title: "Git Basics",
        lessons: &[
            lesson("Introduction to Git", 10, "https://www.theodinproject.com/lessons/foundations-introduction-to-git"),
            lesson("Git Basics", 20, "https://www.theodinproject.com/lessons/foundations-git-basics"),
        ],
    },
    SectionSeed {
        slug: "html-foundations",
        title: "HTML Foundations",
        lessons: &[
            lesson("Introduction to HTML and CSS", 10, "https://www.theodinproject.com/lessons/foundations-introduction-to-html-and-css"),
            lesson("Elements and Tags", 15, "https://www.theodinproject.com/lessons/foundations-elements-and-tags"),
            lesson("HTML Boilerplate", 10, "https://www.theodinproject.com/lessons/foundations-html-boilerplate"),
            lesson("Working with Text", 10, "https://www.theodinproject.com/lessons/foundations-working-with-text"),
            lesson("Lists", 10, "https://www.theodinproject.com/lessons/foundations-lists"),
            lesson("Links and Images", 15, "https://www.theodinproject.com/lessons/foundations-links-and-images"),
            lesson("Commit Messages", 10, "https://www.theodinproject.com/lessons/foundations-commit-messages"),
            project("Project: Recipes", 50, "https://www.theodinproject.com/lessons/foundations-recipes"),
        ],
    },
    SectionSeed {
        slug: "css-foundations",
        title: "CSS Foundations",
        lessons: &[
            lesson("Intro to CSS", 10, "https://www.theodinproject.com/lessons/foundations-introduction-to-css"),
            lesson("The Cascade", 15, "https://www.theodinproject.com/lessons/foundations-the-cascade"),
            lesson("Inspecting HTML and CSS", 10, "https://www.theodinproject.com/lessons/foundations-inspecting-html-and-css"),
            lesson("The Box Model", 20, "https://www.theodinproject.com/lessons/foundations-the-box-model"),
            lesson("Block and Inline", 10, "https://www.theodinproject.com/lessons/foundations-block-and-inline"),
        ],
    },
    SectionSeed {
        slug: "flexbox",
        title: "Flexbox",
        lessons: &[
            lesson("Introduction to Flexbox", 15, "https://www.theodinproject.com/lessons/foundations-introduction-to-flexbox"),
            lesson("Growing and Shrinking", 15, "https://www.theodinproject.com/lessons/foundations-growing-and-shrinking"),
            lesson("Axes", 15, "https://www.theodinproject.com/lessons/foundations-axes"),
            lesson("Alignment", 15, "https://www.theodinproject.com/lessons/foundations-alignment"),
            project("Project: Landing Page", 75, "https://www.theodinproject.com/lessons/foundations-landing-page"),
        ],
    },
    SectionSeed {
        slug: "javascript-basics",
        title: "JavaScript Basics",
        lessons: &[
            lesson("Variables and Operators", 15, "https://www.theodinproject.com/lessons/foundations-fundamentals-part-1"),
            lesson("Installing Node.js", 10, "https://www.theodinproject.com/lessons/foundations-installing-node-js"),
            lesson("Data Types and Conditionals", 15, "https://www.theodinproject.com/lessons/foundations-fundamentals-part-2"),
            lesson("JavaScript Developer Tools", 10, "https://www.theodinproject.com/lessons/foundations-javascript-developer-tools"),
            lesson("Function Basics", 20, "https://www.theodinproject.com/lessons/foundations-fundamentals-part-3"),
            lesson("Problem Solving", 10, "https://www.theodinproject.com/lessons/foundations-problem-solving"),
            lesson("Understanding Errors", 10, "https://www.theodinproject.com/lessons/foundations-understanding-errors"),
            project("Project: Rock Paper Scissors", 60, "https://www.theodinproject.com/lessons/foundations-rock-paper-scissors"),
            lesson("Clean Code", 10, "https://www.theodinproject.com/lessons/foundations-clean-code"),
            lesson("Arrays and Loops", 20, "https://www.theodinproject.com/lessons/foundations-fundamentals-part-4"),
            lesson("DOM Manipulation and Events", 25, "https://www.theodinproject.com/lessons/foundations-dom-manipulation-and-events"),
            lesson("Revisiting Rock Paper Scissors", 20, "https://www.theodinproject.com/lessons/foundations-revisiting-rock-paper-scissors"),
            project("Project: Etch-a-Sketch", 70, "https://www.theodinproject.com/lessons/foundations-etch-a-sketch"),
            lesson("Object Basics", 20, "https://www.theodinproject.com/lessons/foundations-fundamentals-part-5"),
            project("Project: Calculator", 80, "https://www.theodinproject.com/lessons/foundations-calculator"),
        ],
    },
    SectionSeed {
        slug: "conclusion",
        title: "Conclusion",
        lessons: &[
            lesson("Choose Your Path Forward", 5, "https://www.theodinproject.com/lessons/foundations-choose-your-path-forward"),
        ],
    },
];

struct ChallengeSeed {
    title: &'static str,
    description: &'static str,
    kind: ChallengeKind,
    target: i64,
    reward: i64,
}

const STARTER_CHALLENGES: &[ChallengeSeed] = &[
    ChallengeSeed {
        title: "Lesson Sprint",
        description: "Complete 3 lessons today",
        kind: ChallengeKind::CompleteNLessons,
        target: 3,
        reward: 20,
    },
    ChallengeSeed {
        title: "Point Hunter",
        description: "Earn 50 points today",
        kind: ChallengeKind::EarnNPoints,
        target: 50,
        reward: 25,
    },
    ChallengeSeed {
        title: "Ship It",
        description: "Complete a project today",
        kind: ChallengeKind::CompleteProject,
        target: 1,
        reward: 30,
    },
];

/// Seed the Foundations course catalog and starter challenges
pub fn seed_catalog(conn: &Connection) -> Result<()> {
    let mut sections = 0usize;
    let mut lessons = 0usize;

    for (idx, section) in FOUNDATIONS.iter().enumerate() {
        let position = (idx + 1) as i64;
        sections += conn.execute(
            r#"INSERT INTO sections (slug, title, position) VALUES (?1, ?2, ?3)
               ON CONFLICT(slug) DO UPDATE SET title = excluded.title, position = excluded.position"#,
            (section.slug, section.title, position),
        )?;
        let section_id: i64 = conn.query_row(
            "SELECT id FROM sections WHERE slug = ?1",
            [section.slug],
            |r| r.get(0),
        )?;

        for (lidx, l) in section.lessons.iter().enumerate() {
            lessons += conn.execute(
                r#"INSERT INTO lessons (section_id, title, points_value, lesson_type, url, position)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                   ON CONFLICT(section_id, position) DO UPDATE SET
                       title = excluded.title,
                       points_value = excluded.points_value,
                       lesson_type = excluded.lesson_type,
                       url = excluded.url"#,
                (
                    section_id,
                    l.title,
                    l.points,
                    l.kind.as_str(),
                    l.url,
                    (lidx + 1) as i64,
                ),
            )?;
        }
    }

    let mut challenges = 0usize;
    for c in STARTER_CHALLENGES {
        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM daily_challenges WHERE title = ?1",
            [c.title],
            |r| r.get(0),
        )?;
        if exists == 0 {
            challenges += conn.execute(
                r#"INSERT INTO daily_challenges (title, description, challenge_type, target_value, points_reward)
                   VALUES (?1, ?2, ?3, ?4, ?5)"#,
                (c.title, c.description, c.kind.as_str(), c.target, c.reward),
            )?;
        }
    }

    info!(sections, lessons, challenges, "catalog seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ProgressDb;

    #[test]
    fn test_seed_is_idempotent() {
        let db = ProgressDb::open_in_memory().unwrap();
        let conn = db.conn();
        seed_catalog(&conn).unwrap();
        seed_catalog(&conn).unwrap();

        let lessons: i64 = conn
            .query_row("SELECT COUNT(*) FROM lessons", [], |r| r.get(0))
            .unwrap();
        assert_eq!(lessons, 48);

        let sections: i64 = conn
            .query_row("SELECT COUNT(*) FROM sections", [], |r| r.get(0))
            .unwrap();
        assert_eq!(sections, 8);

        let challenges: i64 = conn
            .query_row("SELECT COUNT(*) FROM daily_challenges", [], |r| r.get(0))
            .unwrap();
        assert_eq!(challenges, 3);
    }

    #[test]
    fn test_project_lessons_typed() {
        let db = ProgressDb::open_in_memory().unwrap();
        let conn = db.conn();
        seed_catalog(&conn).unwrap();

        let projects: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM lessons WHERE lesson_type = 'Project'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(projects, 5);
    }
}
