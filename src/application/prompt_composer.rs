// Prompt composer - Builds the critique instruction from optional labeled sections
use crate::domain::check::InitialChecks;
use crate::domain::table::DataTable;

const PREAMBLE: &str = "You are an expert in data visualization ethics and aesthetics. \
Attached is a chart that requires your feedback.";

const TASK: &str = "Chart: see attached image

Your task is to provide constructive feedback to the chart's creator. The goal is to help them improve the chart so it does not mislead viewers, and so it adheres to best practices in ethical and aesthetic data visualization. Consider issues like truncated axes, cherry-picking of data, lack of context, missing data points, inconsistent or deceptive scales, 3D effects that distort proportions, poor color choices or contrast, excessive complexity, missing labels or units, unclear legends, data smoothing that hides variability, selective highlighting that distorts the message, data embellishments, manipulation of time intervals, omitted baselines or zero references, excessive rounding, sampling bias, inappropriate visual metaphors, chartjunk that detracts from clarity, unequal bin sizes in histograms, failure to represent uncertainty, exaggerated differences between pie chart segments, misleading use of area or volume to represent quantity, missing data sources or citations, misleading aspect ratios, selective inclusion of favorable data, and undisclosed limitations of the data.

If the chart is missing certain data or you cannot confirm certain issues due to incomplete information, focus on general best practices and potential pitfalls. If the initial checks are empty or there is no data to analyze, provide general recommendations based on the chart image alone, without mentioning that data was not provided.";

const CLOSING: &str = "Address your feedback directly to the chart's creator, not to the viewer of the chart, guiding them on how to avoid misleading practices and how to improve the aesthetics, clarity and honesty of their visualization.

Separate your feedback into two sections: one for ethical considerations and one for aesthetic considerations. Provide at least 3 points in each section. If a point applies to both, mention it only under ethical considerations and note its connection to aesthetics.

Respond in plain text only. Do not use markdown, bold or italic text, headings, code formatting or any other formatting that requires further rendering. Keep the language direct, clear and instructive. Do not reference these instructions and do not mention that you are an AI. Simply offer advice and observations.";

/// One block of the final instruction, with an optional leading label line.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSection {
    pub label: Option<&'static str>,
    pub body: String,
}

impl PromptSection {
    fn fixed(body: &str) -> Self {
        Self {
            label: None,
            body: body.to_string(),
        }
    }

    fn labeled(label: &'static str, body: String) -> Self {
        Self {
            label: Some(label),
            body,
        }
    }

    fn render(&self) -> String {
        match self.label {
            Some(label) => format!("{}\n{}", label, self.body),
            None => self.body.clone(),
        }
    }
}

/// Inputs of a single prompt, all optional except the check results.
#[derive(Debug, Clone, Copy)]
pub struct PromptInputs<'a> {
    pub checks: &'a InitialChecks,
    pub chart_data: Option<&'a DataTable>,
    pub full_data: Option<&'a DataTable>,
    pub hint: Option<&'a str>,
}

/// Absent series are omitted silently: no placeholder text is ever inserted,
/// the fixed task text already covers the image-only case.
pub fn prompt_sections(inputs: PromptInputs<'_>) -> Vec<PromptSection> {
    let mut sections = vec![PromptSection::fixed(PREAMBLE)];
    sections.extend(check_section(inputs.checks));

    if let Some(chart) = inputs.chart_data.filter(|t| !t.is_empty()) {
        sections.push(PromptSection::labeled(
            "Chart data (the values shown in the chart):",
            strip_markup(&chart.to_compact_json()),
        ));
    }

    if let Some(full) = inputs.full_data.filter(|t| !t.is_empty()) {
        sections.push(PromptSection::labeled(
            "Full dataset (the complete data the chart was drawn from):",
            strip_markup(&full.to_compact_json()),
        ));
    }

    sections.push(PromptSection::fixed(TASK));
    sections.push(PromptSection::fixed(CLOSING));

    if let Some(hint) = inputs.hint.map(str::trim).filter(|h| !h.is_empty()) {
        sections.push(PromptSection::labeled(
            "Additional information from the requester:",
            strip_markup(hint),
        ));
    }

    sections
}

/// Join the present sections into the final instruction.
pub fn compose_prompt(inputs: PromptInputs<'_>) -> String {
    prompt_sections(inputs)
        .iter()
        .map(PromptSection::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn check_section(checks: &InitialChecks) -> Option<PromptSection> {
    if checks.is_empty() {
        return None;
    }

    let lines: Vec<String> = [("Axis Check", &checks.axis), ("Cherry Picking Check", &checks.cherry_pick)]
        .into_iter()
        .filter_map(|(name, result)| result.text().map(|text| format!("{}: {}", name, text)))
        .collect();

    Some(PromptSection::labeled("Initial analysis results:", lines.join("\n")))
}

/// Remove markup that would need rendering from client-supplied text:
/// backticks and runs of two or more `*` or `#`. Removing a run can join two
/// single markers, so runs are collapsed until none remain.
fn strip_markup(text: &str) -> String {
    let mut out: String = text.chars().filter(|c| *c != '`').collect();
    loop {
        let collapsed = collapse_marker_runs(&out);
        if collapsed == out {
            return out;
        }
        out = collapsed;
    }
}

fn collapse_marker_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '*' || c == '#' {
            let mut run = 1;
            while chars.peek() == Some(&c) {
                chars.next();
                run += 1;
            }
            if run == 1 {
                out.push(c);
            }
        } else {
            out.push(c);
        }
    }

    out
}
