use unicode_segmentation::UnicodeSegmentation;

/// One sentence per line. Paragraphs are runs of non-blank lines (trimmed and
/// joined with a space); sentence boundaries follow UAX #29.
pub fn segment(text: &str) -> String {
    let mut sentences: Vec<String> = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        if !line.is_empty() {
            paragraph.push(line);
        } else if !paragraph.is_empty() {
            split_paragraph(&paragraph.join(" "), &mut sentences);
            paragraph.clear();
        }
    }
    if !paragraph.is_empty() {
        split_paragraph(&paragraph.join(" "), &mut sentences);
    }

    sentences.join("\n")
}

fn split_paragraph(paragraph: &str, out: &mut Vec<String>) {
    out.extend(
        paragraph
            .unicode_sentences()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    );
}
