use std::ffi::OsString;
use std::path::Path;

/// One entry of an argument template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Literal(String),
    /// Replaced with the staged input path
    Input,
    /// Replaced with the reserved output path
    Output,
}

/// Engine invocation template: binary, ordered arguments with path
/// placeholders, and the suffix the produced file should carry.
#[derive(Debug, Clone)]
pub struct PipelineSpec {
    binary: String,
    description: String,
    args: Vec<Arg>,
    output_suffix: String,
}

impl PipelineSpec {
    /// Create an empty template for `binary`. The output suffix may be
    /// given with or without its leading dot.
    pub fn new<S1, S2, S3>(binary: S1, description: S2, output_suffix: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        let output_suffix = output_suffix.into();
        let output_suffix = if output_suffix.starts_with('.') {
            output_suffix
        } else {
            format!(".{}", output_suffix)
        };

        Self {
            binary: binary.into(),
            description: description.into(),
            args: Vec::new(),
            output_suffix,
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(Arg::Literal(arg.into()));
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| Arg::Literal(s.into())));
        self
    }

    /// Add the staged input file
    pub fn input(mut self) -> Self {
        self.args.push(Arg::Literal("-i".to_string()));
        self.args.push(Arg::Input);
        self
    }

    /// Add the output file
    pub fn output(mut self) -> Self {
        self.args.push(Arg::Output);
        self
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-acodec").arg(codec)
    }

    /// Copy video stream
    pub fn copy_video(self) -> Self {
        self.video_codec("copy")
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.arg("-c:a").arg("copy")
    }

    /// Copy every stream
    pub fn copy_streams(self) -> Self {
        self.arg("-c").arg("copy")
    }

    /// Disable video
    pub fn no_video(self) -> Self {
        self.arg("-vn")
    }

    /// Constant rate factor
    pub fn crf(self, crf: u8) -> Self {
        self.arg("-crf").arg(crf.to_string())
    }

    /// Encoder speed preset
    pub fn preset<S: Into<String>>(self, preset: S) -> Self {
        self.arg("-preset").arg(preset)
    }

    /// Start position, in seconds
    pub fn seek(self, seconds: f64) -> Self {
        self.arg("-ss").arg(seconds.to_string())
    }

    /// End position, in seconds
    pub fn until(self, seconds: f64) -> Self {
        self.arg("-to").arg(seconds.to_string())
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn template(&self) -> &[Arg] {
        &self.args
    }

    pub fn output_suffix(&self) -> &str {
        &self.output_suffix
    }

    /// Build the final argument vector. `extra` is inserted right before
    /// the output path.
    pub fn render(&self, input: &Path, output: &Path, extra: &[String]) -> Vec<OsString> {
        let mut rendered = Vec::with_capacity(self.args.len() + extra.len());
        for arg in &self.args {
            match arg {
                Arg::Literal(value) => rendered.push(OsString::from(value)),
                Arg::Input => rendered.push(input.as_os_str().to_os_string()),
                Arg::Output => {
                    rendered.extend(extra.iter().map(OsString::from));
                    rendered.push(output.as_os_str().to_os_string());
                }
            }
        }
        rendered
    }
}

/// Inspection invocation template. Only the input placeholder is allowed.
#[derive(Debug, Clone)]
pub struct ProbeSpec {
    binary: String,
    args: Vec<Arg>,
}

impl ProbeSpec {
    pub fn new<S: Into<String>>(binary: S) -> Self {
        Self {
            binary: binary.into(),
            args: Vec::new(),
        }
    }

    /// `-v quiet -print_format json -show_format -show_streams <input>`
    pub fn json_report<S: Into<String>>(binary: S) -> Self {
        Self::new(binary)
            .arg("-v").arg("quiet")
            .arg("-print_format").arg("json")
            .arg("-show_format")
            .arg("-show_streams")
            .target()
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(Arg::Literal(arg.into()));
        self
    }

    /// Add the staged input path as a bare argument
    pub fn target(mut self) -> Self {
        self.args.push(Arg::Input);
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn template(&self) -> &[Arg] {
        &self.args
    }

    pub fn render(&self, input: &Path) -> Vec<OsString> {
        self.args
            .iter()
            .filter_map(|arg| match arg {
                Arg::Literal(value) => Some(OsString::from(value)),
                Arg::Input => Some(input.as_os_str().to_os_string()),
                Arg::Output => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter().map(|a| a.to_string_lossy().to_string()).collect()
    }

    #[test]
    fn test_render_substitutes_paths() {
        let spec = PipelineSpec::new("ffmpeg", "Compress", "mkv")
            .overwrite()
            .input()
            .crf(28)
            .preset("medium")
            .output();

        assert_eq!(spec.output_suffix(), ".mkv");
        let rendered = spec.render(Path::new("/tmp/in.mkv"), Path::new("/tmp/out.mkv"), &[]);
        assert_eq!(
            strings(rendered),
            ["-y", "-i", "/tmp/in.mkv", "-crf", "28", "-preset", "medium", "/tmp/out.mkv"]
        );
    }

    #[test]
    fn test_extra_args_precede_output() {
        let spec = PipelineSpec::new("ffmpeg", "Convert", ".webm")
            .overwrite()
            .input()
            .copy_video()
            .copy_audio()
            .output();

        let extra = vec!["-hide_banner".to_string()];
        let rendered = strings(spec.render(Path::new("in"), Path::new("out"), &extra));
        assert_eq!(
            rendered,
            ["-y", "-i", "in", "-c:v", "copy", "-c:a", "copy", "-hide_banner", "out"]
        );
    }

    #[test]
    fn test_seek_formats_seconds() {
        let spec = PipelineSpec::new("ffmpeg", "Trim", ".mp4").seek(3723.0).until(3724.5);
        let rendered = strings(spec.render(Path::new("in"), Path::new("out"), &[]));
        assert_eq!(rendered, ["-ss", "3723", "-to", "3724.5"]);
    }

    #[test]
    fn test_probe_report_template() {
        let spec = ProbeSpec::json_report("ffprobe");
        let rendered = strings(spec.render(Path::new("/tmp/a.mp4")));
        assert_eq!(
            rendered,
            ["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams", "/tmp/a.mp4"]
        );
    }
}
