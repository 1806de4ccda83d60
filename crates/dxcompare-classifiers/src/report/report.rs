use std::path::Path;

use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::Plot;

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

const STYLE: &str = "
body { font-family: sans-serif; margin: 2em auto; max-width: 1100px; color: #222; }
header { border-bottom: 2px solid #3b6ea5; margin-bottom: 1.5em; }
section { margin-bottom: 2em; }
table { border-collapse: collapse; }
th, td { border: 1px solid #ccc; padding: 4px 10px; text-align: right; }
th:first-child, td:first-child { text-align: left; }
tr.best { background-color: #e3f2e1; font-weight: bold; }
footer { color: #777; font-size: 0.85em; }
";

/// One titled block of a [`Report`]: free-form markup and inline figures.
pub struct ReportSection {
    title: String,
    blocks: Vec<Markup>,
    has_plots: bool,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        ReportSection {
            title: title.to_string(),
            blocks: Vec::new(),
            has_plots: false,
        }
    }

    pub fn add_content(&mut self, content: Markup) {
        self.blocks.push(content);
    }

    /// Embed a plotly figure; a page with figures loads plotly.js once in
    /// its head.
    pub fn add_plot(&mut self, plot: &Plot) {
        self.blocks.push(PreEscaped(plot.to_inline_html(None)));
        self.has_plots = true;
    }

    fn render(&self) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for block in &self.blocks {
                    div { (block) }
                }
            }
        }
    }
}

/// A standalone HTML page made of sections.
pub struct Report {
    software: String,
    version: String,
    title: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(software: &str, version: &str, title: &str) -> Self {
        Report {
            software: software.to_string(),
            version: version.to_string(),
            title: title.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn render(&self) -> Markup {
        let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let needs_plotly = self.sections.iter().any(|s| s.has_plots);
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    @if needs_plotly {
                        script src=(PLOTLY_JS) {}
                    }
                    style { (PreEscaped(STYLE)) }
                }
                body {
                    header {
                        h1 { (self.title) }
                    }
                    @for section in &self.sections {
                        (section.render())
                    }
                    footer {
                        "Generated by " (self.software) " " (self.version) " on " (generated)
                    }
                }
            }
        }
    }

    pub fn save_to_file(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.render().into_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_sections_in_order() {
        let mut report = Report::new("dxcompare", "0.1.0", "Run");
        let mut first = ReportSection::new("Results");
        first.add_content(html! { p { "a < b" } });
        report.add_section(first);
        report.add_section(ReportSection::new("Configuration"));

        let page = report.render().into_string();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("a &lt; b"));
        let results = page.find("Results").unwrap();
        let config = page.find("Configuration").unwrap();
        assert!(results < config);
        assert!(!page.contains(PLOTLY_JS));
    }

    #[test]
    fn figures_pull_in_plotly_once() {
        let mut report = Report::new("dxcompare", "0.1.0", "Run");
        let mut figures = ReportSection::new("Figures");
        let plot = Plot::new();
        figures.add_plot(&plot);
        figures.add_plot(&plot);
        report.add_section(figures);

        let page = report.render().into_string();
        assert_eq!(page.matches(PLOTLY_JS).count(), 1);
        assert_eq!(page.matches("<section>").count(), 1);
    }
}
