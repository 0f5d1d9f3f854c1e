//! Pattern-matching constants, transliterated from `intent_classifier.py`'s
//! keyword lists (Italian / English / Indonesian trilingual coverage).

pub const SIMPLE_GREETINGS: &[&str] = &[
    "ciao", "hello", "hi", "hey", "salve", "buongiorno", "buonasera", "halo", "hallo",
];

pub const IDENTITY_KEYWORDS: &[&str] = &[
    "chi sono", "chi sono io", "chi sei", "mi conosci", "sai chi sono", "cosa sai di me",
    "il mio nome", "il mio ruolo", "mi riconosci",
    "who am i", "who am i?", "do you know me", "my name", "my role", "recognize me", "who is this",
    "siapa saya", "siapa aku", "apakah kamu kenal saya", "nama saya", "kenal saya",
];

pub const TEAM_QUERY_KEYWORDS: &[&str] = &[
    "team", "membri", "colleghi", "chi lavora", "quanti siamo", "dipartimento",
    "bali zero team", "conosci i membri", "parlami del team",
    "team members", "colleagues", "who works", "department", "know the members", "tell me about the team",
    "tim", "anggota tim", "rekan kerja",
];

pub const SESSION_PATTERNS: &[&str] = &[
    "login", "log in", "sign in", "signin", "masuk", "accedi",
    "logout", "log out", "sign out", "signout", "keluar", "esci",
];

pub const CASUAL_PATTERNS: &[&str] = &[
    "come stai", "how are you", "come va", "tutto bene", "apa kabar", "what's up", "whats up",
    "sai chi sono", "do you know me", "know who i am", "recognize me", "remember me", "mi riconosci",
];

pub const EMOTIONAL_PATTERNS: &[&str] = &[
    "aku malu", "saya malu", "i'm embarrassed", "i feel embarrassed", "sono imbarazzato",
    "aku sedih", "saya sedih", "i'm sad", "i feel sad", "sono triste", "mi sento giù",
    "aku khawatir", "saya khawatir", "i'm worried", "i worry", "sono preoccupato", "mi preoccupa",
    "aku kesepian", "saya kesepian", "i'm lonely", "i feel lonely", "mi sento solo",
    "aku stress", "saya stress", "i'm stressed", "sono stressato", "mi sento sopraffatto",
    "aku takut", "saya takut", "i'm scared", "i'm afraid", "ho paura",
    "aku senang", "saya senang", "i'm happy", "sono felice", "che bello",
];

pub const BUSINESS_KEYWORDS: &[&str] = &[
    "visa", "company", "business", "investimento", "investment", "tax", "pajak", "immigration",
    "imigrasi", "permit", "license", "regulation", "real estate", "property", "kbli", "nib", "oss",
    "work permit", "kitas", "kitap", "pma", "pt", "cv", "investor", "investitori", "voa", "b211",
    "211a", "e33g", "e28a",
    "legale", "leggi", "contratto", "memoria", "ricordo", "cliente", "crm", "funzioni", "servizi",
    "errore", "sistema", "conoscenza", "documento", "informazione", "azienda", "consulenza",
    "cerca", "controlla", "puoi", "dimmi", "trova", "pratiche", "visti", "licenze", "tasse",
    "immigrazione",
];

pub const COMPLEX_INDICATORS: &[&str] = &[
    "how to", "how do i", "come si", "bagaimana cara", "cara untuk", "step", "process",
    "procedure", "prosedur", "langkah",
    "explain", "spiegare", "jelaskan", "detail", "dettaglio", "rincian",
    "requirement", "requisiti", "syarat", "what do i need", "cosa serve",
    " and ", " or ", " also ", " e ", " o ", " dan ", " atau ",
];

pub const DEEP_THINK_KEYWORDS: &[&str] = &[
    "strategy", "strategia", "strategi", "analysis", "analisi", "analisa", "compare", "confronta",
    "bandingkan", "pros and cons", "pro e contro", "kelebihan dan kekurangan", "recommendation",
    "raccomandazione", "rekomendasi", "plan", "piano", "rencana", "scenario", "risk assessment",
    "valutazione rischi", "rischi", "rischio", "conviene", "meglio", "migliore", "best option",
    "differenza", "difference", "vs",
];

pub const PRO_KEYWORDS: &[&str] = &[
    "requisiti", "requirements", "costi", "costs", "prezzo", "price", "documenti", "documents",
    "procedura", "procedure", "come ottenere", "how to get", "durata", "duration", "validità",
    "validity", "tasse", "taxes",
];

pub const SIMPLE_PATTERNS: &[&str] = &[
    "what is", "what's", "cos'è", "apa itu", "cosa è", "who is", "chi è", "siapa", "when is",
    "quando", "kapan", "where is", "dove", "dimana",
];

pub const DEVAI_KEYWORDS: &[&str] = &[
    "code", "coding", "programming", "debug", "error", "bug", "function", "api", "devai",
    "typescript", "javascript", "python", "java", "react", "algorithm", "refactor", "optimize",
    "test", "unit test",
];

/// Query-text markers that force-route to the pricing collection, distinct
/// from the filename markers used by the ingestion side
/// (`zantara_ingest::routing`).
pub const PRICING_QUERY_MARKERS: &[&str] = &[
    "price", "prezzo", "harga", "biaya", "cost", "costi", "tarif", "berapa",
];
