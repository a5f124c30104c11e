//! Built-in personas and commands.
//!
//! Used when no config file is found. Declaration order matters: it is the
//! tie-break order for persona scoring and the order commands are detected
//! and listed in.

use crate::config::{CommandSpec, Config, PersonaProfile, ScoringWeights};

struct PersonaDef {
    key: &'static str,
    display_name: &'static str,
    description: &'static str,
    extensions: &'static [&'static str],
    keywords: &'static [&'static str],
    role: &'static str,
}

const PERSONAS: &[PersonaDef] = &[
    PersonaDef {
        key: "architect",
        display_name: "Architect",
        description: "System design, module boundaries and long-term structure",
        extensions: &[],
        keywords: &["architecture", "design", "scalab", "structure", "pattern", "module"],
        role: "You are a software architect. Think in terms of boundaries, dependencies and how the system will evolve. Prefer simple structures that are easy to change.",
    },
    PersonaDef {
        key: "frontend",
        display_name: "Frontend",
        description: "UI components, styling, accessibility and client-side code",
        extensions: &["ts", "tsx", "js", "jsx", "vue", "svelte", "css", "scss", "html"],
        keywords: &["user interface", "component", "layout", "style", "accessibility", "react", "responsive"],
        role: "You are a frontend engineer. Focus on user experience, accessibility, component design and predictable state.",
    },
    PersonaDef {
        key: "backend",
        display_name: "Backend",
        description: "APIs, services, data access and server-side reliability",
        extensions: &["rs", "go", "py", "java", "kt", "rb", "php", "cs", "sql"],
        keywords: &["api", "endpoint", "database", "server", "service", "migration"],
        role: "You are a backend engineer. Focus on correctness, data integrity, clear API contracts and failure handling.",
    },
    PersonaDef {
        key: "security",
        display_name: "Security",
        description: "Threat modeling and vulnerability review",
        extensions: &[],
        keywords: &["security", "vulnerab", "auth", "xss", "injection", "csrf", "secret", "encrypt"],
        role: "You are a security engineer. Look for trust boundaries, unvalidated input and leaked secrets before anything else.",
    },
    PersonaDef {
        key: "performance",
        display_name: "Performance",
        description: "Profiling, bottlenecks and resource usage",
        extensions: &[],
        keywords: &["performance", "slow", "optimiz", "latency", "memory", "benchmark", "profil"],
        role: "You are a performance engineer. Measure first, find the bottleneck, and explain the cost of each suggested change.",
    },
    PersonaDef {
        key: "qa",
        display_name: "QA",
        description: "Testing strategy, edge cases and regressions",
        extensions: &[],
        keywords: &["test", "coverage", "edge case", "regression", "assert", "flaky"],
        role: "You are a QA engineer. Hunt for edge cases and write tests that pin down behavior.",
    },
    PersonaDef {
        key: "refactorer",
        display_name: "Refactorer",
        description: "Code quality, simplification and technical debt",
        extensions: &[],
        keywords: &["refactor", "clean", "simplify", "duplicat", "readab", "rename"],
        role: "You are a refactoring specialist. Improve structure without changing behavior, in small verifiable steps.",
    },
    PersonaDef {
        key: "analyzer",
        display_name: "Analyzer",
        description: "Debugging and root cause analysis",
        extensions: &["log"],
        keywords: &["debug", "error", "bug", "crash", "investigate", "root cause", "fails"],
        role: "You are a debugging specialist. Form hypotheses from the evidence and narrow them down until the root cause is clear.",
    },
    PersonaDef {
        key: "devops",
        display_name: "DevOps",
        description: "Build, deployment and infrastructure",
        extensions: &["yml", "yaml", "tf", "dockerfile", "sh"],
        keywords: &["deploy", "docker", "ci/cd", "pipeline", "kubernetes", "infrastructure"],
        role: "You are a DevOps engineer. Favor reproducible builds, automation and observable deployments.",
    },
    PersonaDef {
        key: "scribe",
        display_name: "Scribe",
        description: "Documentation and technical writing",
        extensions: &["md", "mdx", "rst", "txt"],
        keywords: &["document", "readme", "docs", "comment", "guide", "changelog"],
        role: "You are a technical writer. Write for a reader who has no context, with concrete examples.",
    },
    PersonaDef {
        key: "mentor",
        display_name: "Mentor",
        description: "Explanations and teaching",
        extensions: &[],
        keywords: &["explain", "teach", "learn", "understand", "how does", "what is"],
        role: "You are a patient mentor. Explain the why behind the code, step by step, at the reader's level.",
    },
    PersonaDef {
        key: "general",
        display_name: "General",
        description: "General-purpose coding assistant",
        extensions: &[],
        keywords: &[],
        role: "You are an experienced software engineer. Give direct, practical answers.",
    },
];

struct CommandDef {
    key: &'static str,
    display_name: &'static str,
    trigger: &'static str,
    aliases: &'static [&'static str],
    description: &'static str,
    template: &'static str,
}

const COMMANDS: &[CommandDef] = &[
    CommandDef {
        key: "help",
        display_name: "Help",
        trigger: "/help",
        aliases: &["/?"],
        description: "Show available commands",
        template: "{{help}}",
    },
    CommandDef {
        key: "implement",
        display_name: "Implement",
        trigger: "/implement",
        aliases: &[],
        description: "Implement a feature or component",
        template: "Implement the following. Match the existing code style, handle errors explicitly and add tests for new behavior.\n\nTask: {{args}}",
    },
    CommandDef {
        key: "analyze",
        display_name: "Analyze",
        trigger: "/analyze",
        aliases: &[],
        description: "Analyze code quality, structure and risks",
        template: "Analyze the code for quality, structure, security and performance concerns. Rank findings by impact.\n\nScope: {{args}}",
    },
    CommandDef {
        key: "build",
        display_name: "Build",
        trigger: "/build",
        aliases: &[],
        description: "Build or scaffold a project",
        template: "Set up or fix the build. List the exact commands and files involved.\n\nTarget: {{args}}",
    },
    CommandDef {
        key: "test",
        display_name: "Test",
        trigger: "/test",
        aliases: &[],
        description: "Write or run tests",
        template: "Write focused tests covering normal cases, edge cases and failure paths.\n\nSubject: {{args}}",
    },
    CommandDef {
        key: "improve",
        display_name: "Improve",
        trigger: "/improve",
        aliases: &["/refactor"],
        description: "Improve code quality without changing behavior",
        template: "Improve the following code without changing its behavior. Explain each change briefly.\n\nCode: {{args}}",
    },
    CommandDef {
        key: "explain",
        display_name: "Explain",
        trigger: "/explain",
        aliases: &[],
        description: "Explain code or a concept",
        template: "Explain the following clearly, starting from the big picture and then the details.\n\nTopic: {{args}}",
    },
    CommandDef {
        key: "troubleshoot",
        display_name: "Troubleshoot",
        trigger: "/troubleshoot",
        aliases: &["/debug"],
        description: "Diagnose a bug or failure",
        template: "Diagnose the following problem. State the likely root cause, how to confirm it and the fix.\n\nProblem: {{args}}",
    },
    CommandDef {
        key: "document",
        display_name: "Document",
        trigger: "/document",
        aliases: &["/doc"],
        description: "Write documentation",
        template: "Write documentation for the following, with usage examples.\n\nSubject: {{args}}",
    },
    CommandDef {
        key: "design",
        display_name: "Design",
        trigger: "/design",
        aliases: &[],
        description: "Design a system or API",
        template: "Propose a design for the following. Cover components, interfaces, data flow and trade-offs.\n\nRequirement: {{args}}",
    },
];

fn persona_template(role: &str) -> String {
    format!(
        "{}\n\nActive persona: {{{{persona_name}}}}\nFile: {{{{file_path}}}} (type: {{{{file_type}}}})\n\nRequest: {{{{query}}}}",
        role
    )
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Build the default configuration
pub fn builtin_config() -> Config {
    let personas = PERSONAS
        .iter()
        .map(|p| PersonaProfile {
            key: p.key.to_string(),
            display_name: p.display_name.to_string(),
            description: p.description.to_string(),
            extensions: strings(p.extensions),
            keywords: strings(p.keywords),
            template: persona_template(p.role),
        })
        .collect();

    let commands = COMMANDS
        .iter()
        .map(|c| CommandSpec {
            key: c.key.to_string(),
            display_name: c.display_name.to_string(),
            trigger: c.trigger.to_string(),
            aliases: strings(c.aliases),
            description: c.description.to_string(),
            template: c.template.to_string(),
        })
        .collect();

    Config {
        default_persona: Some("general".to_string()),
        scoring: ScoringWeights::default(),
        personas,
        commands,
        persona_dir: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_template_placeholders() {
        let template = persona_template("Role.");
        assert!(template.starts_with("Role."));
        assert!(template.contains("{{persona_name}}"));
        assert!(template.contains("{{file_type}}"));
        assert!(template.contains("{{query}}"));
    }

    #[test]
    fn test_builtin_triggers_are_slash_prefixed() {
        let config = builtin_config();
        for command in &config.commands {
            assert!(command.trigger.starts_with('/'), "{}", command.key);
        }
    }

    #[test]
    fn test_default_persona_has_no_rules() {
        let config = builtin_config();
        let general = config
            .personas
            .iter()
            .find(|p| p.key == "general")
            .expect("general persona");
        assert!(general.extensions.is_empty());
        assert!(general.keywords.is_empty());
    }
}
