//! Sheet configurations: names, tab colours, generated formula columns and
//! dropdown sets. Formulas carry a `{row}` placeholder substituted at write
//! time.
//!
//! Column letters are pinned to the fixed tool layouts below and to the
//! fixed-width sample naming scheme (9-char run id, 10-char specimen id,
//! 7-char panel), which keeps the `MID`/`LEFT` substrings in agreement with
//! the hyphen-split specimen parser. The tests at the bottom of this module
//! re-derive every letter from the layouts.

use crate::models::{DropDown, ExtraCol, PivotConfig, SheetConfig, SummaryConfig};

pub const PREDICTOR_SHEET: SheetConfig = SheetConfig {
    sheet_name: "STAR-Fusion",
    tab_color: 0x800080,
};
pub const ANNOTATION_SHEET: SheetConfig = SheetConfig {
    sheet_name: "Fusion_Inspector",
    tab_color: 0xA52A2A,
};
pub const QC_SHEET: SheetConfig = SheetConfig {
    sheet_name: "FastQC",
    tab_color: 0x008000,
};
pub const QC_PIVOT_SHEET: SheetConfig = SheetConfig {
    sheet_name: "FastQC_Pivot",
    tab_color: 0x00FF00,
};
pub const HISTORY_SHEET: SheetConfig = SheetConfig {
    sheet_name: "Previous_Runs",
    tab_color: 0x000000,
};
pub const EPIC_SHEET: SheetConfig = SheetConfig {
    sheet_name: "EPIC",
    tab_color: 0x0000FF,
};
pub const SUMMARY_SHEET: SheetConfig = SheetConfig {
    sheet_name: "Summary",
    tab_color: 0x9400D3,
};

/// Predictor output columns, in file order, after the origin column.
pub const PREDICTOR_RAW_COLUMNS: &[&str] = &[
    "file_name",
    "#FusionName",
    "JunctionReadCount",
    "SpanningFragCount",
    "est_J",
    "est_S",
    "SpliceType",
    "LeftGene",
    "LeftBreakpoint",
    "RightGene",
    "RightBreakpoint",
    "LargeAnchorSupport",
    "FFPM",
    "LeftBreakDinuc",
    "LeftBreakEntropy",
    "RightBreakDinuc",
    "RightBreakEntropy",
    "annots",
];

/// Annotation output columns, in file order, after the origin column.
pub const ANNOTATION_RAW_COLUMNS: &[&str] = &[
    "file_name",
    "#FusionName",
    "JunctionReadCount",
    "SpanningFragCount",
    "est_J",
    "est_S",
    "SpliceType",
    "LeftGene",
    "LeftBreakpoint",
    "LeftLocalBreakpoint",
    "RightGene",
    "RightBreakpoint",
    "RightLocalBreakpoint",
    "LargeAnchorSupport",
    "NumCounterFusionLeft",
    "NumCounterFusionRight",
    "FAR_left",
    "FAR_right",
    "LeftBreakDinuc",
    "LeftBreakEntropy",
    "RightBreakDinuc",
    "RightBreakEntropy",
    "microH_brkpt_dist",
    "FFPM",
    "annots",
    "CDS_LEFT_ID",
    "CDS_LEFT_RANGE",
    "CDS_RIGHT_ID",
    "CDS_RIGHT_RANGE",
    "FUSION_MODEL",
    "PROT_FUSION_TYPE",
    "FUSION_CDS",
    "FUSION_TRANSL",
    "PFAM_LEFT",
    "PFAM_RIGHT",
];

/// Formula columns prefixed to the predictor sheet: ten columns A..J, with
/// the raw table starting at K (`file_name`).
pub const PREDICTOR_EXTRA_COLS: &[ExtraCol] = &[
    ExtraCol { header: "SPECIMEN", formula: "=MID(K{row},11,10)" },
    ExtraCol { header: "FNAME", formula: "=LEFT(K{row},28)" },
    ExtraCol { header: "Count_predicted", formula: "=VLOOKUP(L{row},'Previous_Runs'!A:B,2,0)" },
    ExtraCol { header: "EPIC", formula: "=VLOOKUP(A{row},'EPIC'!AJ:AK,2,0)" },
    ExtraCol { header: "DAYS COUNT", formula: "=VLOOKUP(A{row},'EPIC'!AJ:AL,3,0)" },
    ExtraCol { header: "Unique Reads(M)", formula: "=VLOOKUP(A{row},'FastQC_Pivot'!A:C,3,0)" },
    ExtraCol { header: "Duplicate Reads(M)", formula: "=VLOOKUP(A{row},'FastQC_Pivot'!A:B,2,0)" },
    ExtraCol { header: "ID", formula: "=CONCATENATE(A{row},\"_\",L{row})" },
    ExtraCol { header: "LEFTRIGHT", formula: "=CONCATENATE(S{row},\"_\",U{row})" },
    ExtraCol { header: "FRAME", formula: "=VLOOKUP(I{row},'Fusion_Inspector'!C:AM,32,0)" },
];

/// Formula columns prefixed to the annotation sheet (A..C, raw table from D).
pub const ANNOTATION_EXTRA_COLS: &[ExtraCol] = &[
    ExtraCol { header: "SPECIMEN", formula: "=MID(D{row},11,10)" },
    ExtraCol { header: "ID", formula: "=CONCATENATE(A{row},\"_\",E{row})" },
    ExtraCol { header: "LEFTRIGHT", formula: "=CONCATENATE(L{row},\"_\",O{row})" },
];

/// Formula columns prefixed to the QC sheet (A..B, raw table from C).
pub const QC_EXTRA_COLS: &[ExtraCol] = &[
    ExtraCol { header: "SPECIMEN", formula: "=MID(C{row},11,10)" },
    ExtraCol { header: "EPIC", formula: "=VLOOKUP(A{row},'EPIC'!AJ:AK,2,0)" },
];

/// Grouping of the joined table into the summary: one row per
/// (filename, specimen, QC metrics, breakpoint pair).
pub const SUMMARY_PIVOT: PivotConfig = PivotConfig {
    index: &[
        "Filename",
        "SPECIMEN",
        "Unique Reads(M)",
        "Duplicate Reads(M)",
        "LEFTRIGHT",
    ],
    values: &[
        "LeftBreakpoint",
        "#FusionName",
        "RightBreakpoint",
        "JunctionReadCount",
        "SpanningFragCount",
        "Count_predicted",
        "ReferenceSources",
        "PreviousPositives",
        "FRAME",
        "FFPM",
    ],
};

/// Lookup columns inserted after the specimen column of the summary sheet,
/// anchored once per merged specimen block.
pub const SUMMARY_LOOKUP_COLS: &[ExtraCol] = &[
    ExtraCol { header: "EPIC", formula: "=VLOOKUP(B{row},'EPIC'!AJ:AK,2,0)" },
    ExtraCol { header: "DAYS COUNT", formula: "=VLOOKUP(B{row},'EPIC'!AJ:AL,3,0)" },
];

pub const SUMMARY_DROP_DOWNS: &[DropDown] = &[
    DropDown {
        header: "Reported",
        options: &["Yes", "No"],
        prompt: "Choose Yes or No",
        title: "Fusion reported or not?",
    },
    DropDown {
        header: "Oncogenicity",
        options: &[
            "Pathogenic",
            "Likely Pathogenic",
            "VUS",
            "Likely Benign",
            "Benign",
        ],
        prompt: "Select from the list",
        title: "Oncogenicity",
    },
];

pub const SUMMARY: SummaryConfig = SummaryConfig {
    sheet: SUMMARY_SHEET,
    lookup_cols: SUMMARY_LOOKUP_COLS,
    drop_downs: SUMMARY_DROP_DOWNS,
    ffpm_col: "FFPM",
    index_col: "SPECIMEN",
};
