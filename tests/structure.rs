//! Behavioural tests for the plain-text structurer through the public API.

use edgequake_pdf2html::structure::{classify, LineKind, ListKind};
use edgequake_pdf2html::structure_text;

#[test]
fn blank_input_yields_nothing() {
    assert_eq!(structure_text(""), "");
    assert_eq!(structure_text("\n\n   \n\t\n"), "");
}

#[test]
fn short_uppercase_line_is_h1() {
    assert_eq!(structure_text("HELLO WORLD"), "<h1>HELLO WORLD</h1>\n");
}

#[test]
fn numbered_lines_share_one_ordered_list() {
    assert_eq!(
        structure_text("1. First\n2. Second"),
        "<ol>\n  <li>First</li>\n  <li>Second</li>\n</ol>\n"
    );
}

#[test]
fn switching_list_kind_closes_previous_list() {
    let html = structure_text("1. Siapkan dokumen\n- fotokopi KTP\n- pas foto");
    assert_eq!(
        html,
        "<ol>\n  <li>Siapkan dokumen</li>\n</ol>\n<ul>\n  <li>fotokopi KTP</li>\n  <li>pas foto</li>\n</ul>\n"
    );
    assert_eq!(html.matches("<ol>").count(), html.matches("</ol>").count());
    assert_eq!(html.matches("<ul>").count(), html.matches("</ul>").count());
}

#[test]
fn trailing_list_is_closed() {
    assert_eq!(structure_text("- item"), "<ul>\n  <li>item</li>\n</ul>\n");
}

#[test]
fn paragraph_interrupts_list() {
    assert_eq!(
        structure_text("a) pertama\nlanjutan teks biasa di sini\nb) kedua"),
        "<ul>\n  <li>pertama</li>\n</ul>\n<p>lanjutan teks biasa di sini</p>\n<ul>\n  <li>kedua</li>\n</ul>\n"
    );
}

#[test]
fn blank_lines_do_not_break_lists() {
    assert_eq!(
        structure_text("1. satu\n\n   \n2. dua"),
        "<ol>\n  <li>satu</li>\n  <li>dua</li>\n</ol>\n"
    );
}

#[test]
fn faq_questions_get_restatement() {
    let html = structure_text("FAQ LAYANAN\nbagaimana cara mendaftar akun baru?");
    assert_eq!(
        html,
        "<h1>FAQ LAYANAN</h1>\nbagaimana cara mendaftar akun baru?<br>\n<strong>Berikut ini adalah FAQ LAYANAN</strong>\n"
    );
}

#[test]
fn questions_outside_faq_are_paragraphs() {
    assert_eq!(
        structure_text("apa saja syarat pendaftaran?"),
        "<p>apa saja syarat pendaftaran?</p>\n"
    );
}

#[test]
fn faq_context_survives_later_headings() {
    let html = structure_text("FAQ\nPROSEDUR UMUM\nkapan layanan dibuka?");
    assert!(html.ends_with("<strong>Berikut ini adalah FAQ</strong>\n"), "{html}");
}

#[test]
fn sop_subheading_is_repeated_as_h3() {
    assert_eq!(
        structure_text("Standard Operating Procedure Keuangan"),
        "<h2>Standard Operating Procedure Keuangan</h2>\n<h3>Standard Operating Procedure Keuangan</h3>\n"
    );
}

#[test]
fn long_uppercase_line_is_not_h1() {
    let html = structure_text("INI ADALAH KALIMAT YANG SANGAT PANJANG SEKALI");
    assert!(!html.contains("<h1>"), "{html}");
}

#[test]
fn text_is_escaped() {
    assert_eq!(
        structure_text("harga < 5 & > 1 rupiah saja"),
        "<p>harga &lt; 5 &amp; &gt; 1 rupiah saja</p>\n"
    );
}

#[test]
fn output_is_not_a_round_trip() {
    let html = structure_text("1. Langkah Awal");
    let stripped: String = html
        .lines()
        .map(|l| l.trim().trim_start_matches("<li>").trim_end_matches("</li>"))
        .filter(|l| !l.starts_with('<'))
        .collect::<Vec<_>>()
        .join("\n");
    // "Langkah Awal" is now title case and re-classifies as a heading.
    assert_eq!(structure_text(&stripped), "<h2>Langkah Awal</h2>\n");
}

#[test]
fn classify_reports_list_kind() {
    assert!(matches!(
        classify("12. dua belas", false),
        LineKind::ListItem { list: ListKind::Ordered, body: "dua belas" }
    ));
    assert!(matches!(
        classify("• poin", false),
        LineKind::ListItem { list: ListKind::Unordered, body: "poin" }
    ));
}

#[test]
fn title_case_word_limit() {
    assert_eq!(
        structure_text("Panduan Layanan Pelanggan Untuk Seluruh Kantor Cabang"),
        "<h2>Panduan Layanan Pelanggan Untuk Seluruh Kantor Cabang</h2>\n"
    );
    assert_eq!(
        structure_text("Panduan Layanan Pelanggan Untuk Seluruh Kantor Cabang Daerah"),
        "<p>Panduan Layanan Pelanggan Untuk Seluruh Kantor Cabang Daerah</p>\n"
    );
}

#[test]
fn title_case_may_start_with_digits_or_punctuation() {
    assert_eq!(
        structure_text("2024 Laporan Tahunan"),
        "<h2>2024 Laporan Tahunan</h2>\n"
    );
    assert_eq!(
        structure_text("(Lampiran) Dokumen Umum"),
        "<h2>(Lampiran) Dokumen Umum</h2>\n"
    );
}

#[test]
fn heading_closes_open_list() {
    assert_eq!(
        structure_text("- one\nRINGKASAN"),
        "<ul>\n  <li>one</li>\n</ul>\n<h1>RINGKASAN</h1>\n"
    );
}

#[test]
fn faq_question_closes_ordered_list() {
    assert_eq!(
        structure_text("FAQ\n1. langkah pertama\nbagaimana jika gagal?"),
        "<h1>FAQ</h1>\n<ol>\n  <li>langkah pertama</li>\n</ol>\n\
         bagaimana jika gagal?<br>\n<strong>Berikut ini adalah FAQ</strong>\n"
    );
}

#[test]
fn whitespace_after_list_prefix_is_dropped() {
    assert_eq!(
        structure_text("1.   spasi"),
        "<ol>\n  <li>spasi</li>\n</ol>\n"
    );
    assert_eq!(structure_text("a)satu"), "<ul>\n  <li>satu</li>\n</ul>\n");
}
