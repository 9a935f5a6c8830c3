//! Prompt templates for the chat service. Templates use `format!()`
//! interpolation; the persona, fixed replies, and answer rules are product
//! content and are kept in the product's language.

use crate::models::ChunkRecord;

/// Fixed persona and ground rules sent as the system message on every
/// completion request.
pub const SYSTEM_PROMPT: &str = "\
Anda adalah asisten layanan pelanggan Lontar.

IDENTITAS:
- Nama Anda: Asisten Lontar
- Panggilan customer: \"kak\"
- Gaya bicara: Ramah, profesional, jelas

ATURAN WAJIB:
1. Gunakan hanya informasi dari DATA REFERENSI.
2. Jangan mengarang informasi.
3. Jangan menambahkan nomor telepon/email jika tidak ada di data.
4. Default: jawab singkat dan langsung ke inti.
5. Hanya berikan penjelasan panjang jika user meminta detail, fitur, atau perbandingan.
6. Hindari pengulangan.
7. Jika data tidak tersedia, katakan:
\"Maaf kak, informasi tersebut belum tersedia di sistem saya.\"
";

/// The reply the model is instructed to give when retrieval falls below the
/// relevance gate.
pub const ESCALATION_REPLY: &str =
    "Maaf kak, info tersebut belum ada. Mau saya bantu tanyakan dulu ke admin?";

/// Fixed reply substituted when the completion collaborator fails.
pub const TECHNICAL_FALLBACK: &str =
    "Maaf kak, sedang ada kendala teknis. Bisa dicoba lagi nanti ya.";

/// Queries containing any of these ask for an expanded answer.
pub const DETAIL_KEYWORDS: &[&str] = &[
    "detail",
    "fitur",
    "rincian",
    "lengkap",
    "jelaskan",
    "perbedaan",
    "apa saja",
    "bagaimana",
    "proses",
    "spesifikasi",
];

/// True when the query asks for detail, selecting the expanded verbosity rule.
pub fn is_detail_question(query: &str) -> bool {
    let query_lower = query.to_lowercase();
    DETAIL_KEYWORDS
        .iter()
        .any(|keyword| query_lower.contains(keyword))
}

/// Prompt used when the best similarity falls below the relevance gate: no
/// reference data is included and the model is instructed to apologize and
/// offer escalation to a human.
pub fn escalation_prompt() -> String {
    format!(
        "DATA REFERENSI:\n(Tidak ada data relevan)\n\nJawab:\n\"{ESCALATION_REPLY}\"\n"
    )
}

/// Render retrieved chunks as the reference block, each tagged with its
/// similarity score.
pub fn reference_block(hits: &[(&ChunkRecord, f32)]) -> String {
    let mut block = String::new();
    for (i, (chunk, similarity)) in hits.iter().enumerate() {
        block.push_str(&format!(
            "\n[DATA {} | similarity: {:.2}]\n{}\n",
            i + 1,
            similarity,
            chunk.text
        ));
    }
    block
}

/// Assemble the answer prompt from retrieved references, recent dialogue
/// context, and the verbosity rule.
pub fn answer_prompt(query: &str, reference_text: &str, history_context: &str, detail: bool) -> String {
    let history = if history_context.is_empty() {
        "(Tidak ada konteks sebelumnya)"
    } else {
        history_context
    };

    let length_rule = if detail {
        "Jelaskan secara detail dan terstruktur (boleh bullet point)."
    } else {
        "Jawab singkat, maksimal 3\u{2013}4 kalimat langsung ke inti."
    };

    format!(
        "KONTEKS PERCAKAPAN:\n{history}\n\n\
         DATA REFERENSI:\n{reference_text}\n\n\
         PERTANYAAN USER:\n{query}\n\n\
         ATURAN JAWABAN:\n\
         - Gunakan hanya DATA REFERENSI.\n\
         - Gabungkan informasi dari beberapa DATA jika relevan.\n\
         - Jangan menambahkan informasi baru.\n\
         - {length_rule}\n\
         - Hindari pengulangan kalimat.\n\n\
         JAWABAN:\n"
    )
}
