//! Fixed column layout of the clinical input file.
//!
//! The input header uses Turkish column names. They are remapped to the
//! canonical English names below by exact match only. A few of the source
//! names contain Cyrillic look-alike letters (`и`, `у`, `о`, `м`, `к`, `р`);
//! they are kept byte-for-byte, so a header spelled with the Latin letters is
//! left as is.

/// Source header name to canonical name.
pub const COLUMN_RENAMES: [(&str, &str); 20] = [
    ("Hasta_ID", "Id"),
    ("Yaş", "Age"),
    ("Cinsiyet", "Gender"),
    ("Eğitim_Seviyesi", "Education_Level"),
    ("Medeni_Durum", "Martial_Statuts"),
    ("Meslek", "Occupation"),
    ("Gelir_Düzeyi", "Income_level"),
    ("Yaşadığı_Yer", "Live_Area"),
    ("Tanı", "Diagnosis"),
    ("Hastalık_Süresi", "Disease_Duration"),
    ("Hastaneye_Yatış_Sayısı", "Hospitalizations"),
    ("Ailede_Şizofrenи_Öyküsü", "Family_History"),
    ("Madde_Kullanımı", "Substance_Use"),
    ("İntihar_Girişimi", "Suicide_Attempts"),
    ("Pozitif_Semptom_Skorу", "Positive_Symptoms_Score"),
    ("Negatif_Semptом_Sкору", "Negative_Symptoms_Score"),
    ("GAF_Sкору", "Global_Assessment_of_Functioning_Score"),
    ("Sosyal_Destek", "Social_Support"),
    ("Stres_Faktörleri", "Stress_Factors"),
    ("İlaç_Uyumu", "Adherence_to_Medication"),
];

/// Columns dropped before modelling: identifier, duration/count fields and
/// demographic or contextual fields.
pub const EXCLUDED_COLUMNS: [&str; 12] = [
    "Id",
    "Disease_Duration",
    "Hospitalizations",
    "Stress_Factors",
    "Social_Support",
    "Gender",
    "Martial_Statuts",
    "Occupation",
    "Live_Area",
    "Age",
    "Education_Level",
    "Income_level",
];

/// Label to predict.
pub const TARGET_COLUMN: &str = "Diagnosis";

/// Column whose class distribution is plotted before modelling.
pub const DISTRIBUTION_COLUMN: &str = "Suicide_Attempts";
