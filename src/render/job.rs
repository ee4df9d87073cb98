//! Render job construction: one renderer command line per key part.

use crate::catalog::Catalog;
use crate::escape::escape_text;
use crate::model::{KeyDescriptor, OutputMode, RenderPart};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// What every job in a run shares.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Renderer executable, looked up on `PATH` when relative.
    pub renderer: PathBuf,
    /// Template file passed as the renderer's input.
    pub template: PathBuf,
    pub out_dir: PathBuf,
    pub mode: OutputMode,
}

impl RenderSettings {
    pub fn new(
        renderer: impl Into<PathBuf>,
        template: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            renderer: renderer.into(),
            template: template.into(),
            out_dir: out_dir.into(),
            mode: OutputMode::default(),
        }
    }

    pub fn mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Jobs for every key in the catalog, in catalog order.
    pub fn plan(&self, catalog: &Catalog) -> Vec<RenderJob> {
        catalog.iter().flat_map(|key| self.jobs_for(key)).collect()
    }

    /// One job per part of the output mode.
    pub fn jobs_for(&self, key: &KeyDescriptor) -> Vec<RenderJob> {
        self.mode
            .parts()
            .iter()
            .map(|&part| RenderJob::new(self, key, part))
            .collect()
    }

    /// File names a complete run leaves in the output directory.
    pub fn expected_outputs(&self, catalog: &Catalog) -> BTreeSet<String> {
        catalog
            .iter()
            .flat_map(|key| {
                self.mode
                    .parts()
                    .iter()
                    .map(move |part| part.file_name(&key.name))
            })
            .collect()
    }
}

/// A single renderer invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub key: String,
    pub part: RenderPart,
    pub output: PathBuf,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl RenderJob {
    pub fn new(settings: &RenderSettings, key: &KeyDescriptor, part: RenderPart) -> Self {
        let output = settings.out_dir.join(part.file_name(&key.name));

        let mut args = vec![
            "-o".to_string(),
            output.to_string_lossy().into_owned(),
            "-D".to_string(),
            format!("key_length={}", key.unit_width),
            "-D".to_string(),
            format!("key_text=\"{}\"", escape_text(&key.text)),
            "-D".to_string(),
            format!("key_text_fontsize={}", key.font_size),
        ];
        if let Some((keycap, label)) = part.flags() {
            args.push("-D".to_string());
            args.push(format!("render_keycap={keycap}"));
            args.push("-D".to_string());
            args.push(format!("render_label={label}"));
        }
        args.push(settings.template.to_string_lossy().into_owned());

        Self {
            key: key.name.clone(),
            part,
            output,
            program: settings.renderer.clone(),
            args,
        }
    }

    /// Process builder for this job. Renderer output is inherited unless
    /// `quiet` is set.
    pub fn command(&self, quiet: bool) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).stdin(Stdio::null()).kill_on_drop(true);
        if quiet {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        cmd
    }

    /// Shell-pasteable rendering of the command line.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .map(|arg| shell_quote(&arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./=:,+%@".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyTables;

    fn settings(mode: OutputMode) -> RenderSettings {
        RenderSettings::new("openscad", "key.scad", "out").mode(mode)
    }

    #[test]
    fn combined_job_matches_renderer_contract() {
        let key = KeyDescriptor::new("alph_Q", "Q", 6.0, 1.0);
        let jobs = settings(OutputMode::Combined).jobs_for(&key);
        assert_eq!(jobs.len(), 1);
        assert_eq!(
            jobs[0].args,
            [
                "-o",
                "out/alph_Q.stl",
                "-D",
                "key_length=1",
                "-D",
                "key_text=\"\\u0051\"",
                "-D",
                "key_text_fontsize=6",
                "key.scad",
            ]
        );
    }

    #[test]
    fn split_jobs_differ_only_in_output_and_flags() {
        let key = KeyDescriptor::new("f3", "F3", 6.0, 1.25);
        let jobs = settings(OutputMode::Split).jobs_for(&key);
        assert_eq!(jobs.len(), 2);

        let (keycap, label) = (&jobs[0], &jobs[1]);
        assert_eq!(keycap.output, PathBuf::from("out/f3_keycap.stl"));
        assert_eq!(label.output, PathBuf::from("out/f3_label.stl"));
        assert!(keycap.args.contains(&"render_keycap=true".to_string()));
        assert!(keycap.args.contains(&"render_label=false".to_string()));
        assert!(label.args.contains(&"render_keycap=false".to_string()));
        assert!(label.args.contains(&"render_label=true".to_string()));

        let differing: Vec<_> = keycap
            .args
            .iter()
            .zip(&label.args)
            .filter(|(a, b)| a != b)
            .map(|(a, _)| a.as_str())
            .collect();
        assert_eq!(
            differing,
            ["out/f3_keycap.stl", "render_keycap=true", "render_label=false"]
        );
    }

    #[test]
    fn fractional_widths_are_passed_verbatim() {
        let key = KeyDescriptor::new("space", "", 6.0, 6.25);
        let job = &settings(OutputMode::Combined).jobs_for(&key)[0];
        assert!(job.args.contains(&"key_length=6.25".to_string()));
        assert!(job.args.contains(&"key_text=\"\"".to_string()));
    }

    #[test]
    fn plan_covers_expected_outputs() {
        let catalog = Catalog::build(&KeyTables::default()).unwrap();
        let settings = settings(OutputMode::Split);
        let plan = settings.plan(&catalog);
        assert_eq!(plan.len(), catalog.len() * 2);

        let names: BTreeSet<String> = plan
            .iter()
            .map(|job| job.output.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, settings.expected_outputs(&catalog));
    }

    #[test]
    fn command_line_quotes_special_arguments() {
        let key = KeyDescriptor::new("alph_A", "A", 6.0, 1.0);
        let job = &settings(OutputMode::Combined).jobs_for(&key)[0];
        assert_eq!(
            job.command_line(),
            "openscad -o out/alph_A.stl -D key_length=1 -D 'key_text=\"\\u0041\"' -D key_text_fontsize=6 key.scad"
        );
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }
}
