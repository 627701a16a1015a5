//! 文本诊断渲染器

use owo_colors::OwoColorize;

use crate::util::diagnostic::{Diagnostic, Severity};
use crate::util::span::SourceFile;

/// 渲染器配置
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// 是否启用颜色输出
    pub use_colors: bool,
    /// 是否显示源码片段
    pub show_source: bool,
    /// 是否显示帮助信息
    pub show_help: bool,
    /// 是否显示相关诊断
    pub show_related: bool,
    /// 指示字符 (默认: "^")
    pub indicator: char,
    /// 最大显示行数
    pub max_lines: usize,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            use_colors: true,
            show_source: true,
            show_help: true,
            show_related: true,
            indicator: '^',
            max_lines: 6,
        }
    }
}

impl EmitterConfig {
    /// 无颜色配置，用于测试与非终端输出
    pub fn plain() -> Self {
        Self {
            use_colors: false,
            ..Self::default()
        }
    }
}

/// 文本诊断渲染器
#[derive(Debug, Clone, Default)]
pub struct TextEmitter {
    config: EmitterConfig,
}

impl TextEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EmitterConfig) -> Self {
        Self { config }
    }

    /// 渲染单个诊断
    pub fn render(
        &self,
        diagnostic: &Diagnostic,
        source_file: Option<&SourceFile>,
    ) -> String {
        let mut output = String::new();
        self.render_into(&mut output, diagnostic, source_file);
        output
    }

    /// 渲染多个诊断，末尾附带统计
    pub fn render_all<'a>(
        &self,
        diagnostics: impl IntoIterator<Item = &'a Diagnostic>,
        source_file: Option<&SourceFile>,
    ) -> String {
        let mut output = String::new();
        let (mut errors, mut warnings) = (0, 0);
        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Error => errors += 1,
                Severity::Warning => warnings += 1,
                _ => {}
            }
            self.render_into(&mut output, diagnostic, source_file);
            output.push('\n');
        }
        if errors + warnings > 0 {
            output.push_str(&format!("{} error(s), {} warning(s)\n", errors, warnings));
        }
        output
    }

    fn render_into(
        &self,
        output: &mut String,
        diagnostic: &Diagnostic,
        source_file: Option<&SourceFile>,
    ) {
        output.push_str(&self.render_header(diagnostic));
        output.push_str(&self.render_location(diagnostic, source_file));

        if self.config.show_source {
            if let Some(snippet) = self.render_source_snippet(diagnostic, source_file) {
                output.push_str(&snippet);
            }
        }

        if self.config.show_help && !diagnostic.help.is_empty() {
            output.push_str(&format!("     = help: {}\n", diagnostic.help));
        }

        if self.config.show_related {
            for related in &diagnostic.related {
                self.render_into(output, related, source_file);
            }
        }
    }

    fn render_header(
        &self,
        diagnostic: &Diagnostic,
    ) -> String {
        let label = format!("{}[{}]", diagnostic.severity, diagnostic.code);
        if !self.config.use_colors {
            return format!("{}: {}\n", label, diagnostic.message);
        }
        let label = match diagnostic.severity {
            Severity::Error => label.red().bold().to_string(),
            Severity::Warning => label.yellow().bold().to_string(),
            Severity::Info => label.blue().bold().to_string(),
            Severity::Hint => label.cyan().bold().to_string(),
        };
        format!("{}: {}\n", label, diagnostic.message.bold())
    }

    fn render_location(
        &self,
        diagnostic: &Diagnostic,
        source_file: Option<&SourceFile>,
    ) -> String {
        match &diagnostic.span {
            Some(span) if !span.is_dummy() => {
                let file_name = diagnostic
                    .file
                    .as_deref()
                    .or(source_file.map(|sf| sf.name.as_str()))
                    .unwrap_or("<unknown>");
                format!(
                    "  --> {}:{}:{}\n",
                    file_name, span.start.line, span.start.column
                )
            }
            _ => String::new(),
        }
    }

    fn render_source_snippet(
        &self,
        diagnostic: &Diagnostic,
        source_file: Option<&SourceFile>,
    ) -> Option<String> {
        let span = diagnostic.span.as_ref()?;
        if span.is_dummy() {
            return None;
        }
        let source_file = source_file?;
        let start_line = span.start.line;
        let end_line = span.end.line.max(start_line);
        let lines_to_show = (end_line - start_line + 1).min(self.config.max_lines);

        let mut output = String::new();
        for i in 0..lines_to_show {
            let line_num = start_line + i;
            let Some(line) = source_file.line(line_num) else {
                break;
            };
            output.push_str(&format!("{:>4} | {}\n", line_num, line));

            if i == 0 {
                let spaces = " ".repeat(span.start.column.saturating_sub(1));
                let width = if start_line == end_line {
                    span.end.column.saturating_sub(span.start.column).max(1)
                } else {
                    line.len()
                        .saturating_sub(span.start.column.saturating_sub(1))
                        .max(1)
                };
                let carets = self.config.indicator.to_string().repeat(width);
                let carets = if self.config.use_colors {
                    match diagnostic.severity {
                        Severity::Error => carets.red().to_string(),
                        _ => carets.yellow().to_string(),
                    }
                } else {
                    carets
                };
                output.push_str(&format!("     | {}{}\n", spaces, carets));
            }
        }
        Some(output)
    }
}
