//! Page layouts, the named regions cropped from the first page and the
//! anchor rules used to tell layout variants apart.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::text::{Case, normalize_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutId {
    #[default]
    V1,
    V2,
}

impl LayoutId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "v1" => Ok(Self::V1),
            "v2" => Ok(Self::V2),
            other => Err(format!("unknown layout '{other}', expected v1 or v2")),
        }
    }
}

/// A named rectangle of the rendered page, in pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub name: &'static str,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

pub const DESCRICAO_FATURAMENTO: &str = "DESCRICAO_FATURAMENTO";
pub const TRIBUTOS: &str = "TRIBUTOS";
pub const CLASSIFICACAO_UNIDADE_CONSUMIDORA: &str = "CLASSIFICACAO_UNIDADE_CONSUMIDORA";
pub const TIPO_FORNECIMENTO: &str = "TIPO_FORNECIMENTO";
pub const NUMERO_INSTALACAO: &str = "NUMERO_INSTALACAO";
pub const NUMERO_CLIENTE: &str = "NUMERO_CLIENTE";
pub const PERIODO_FATURAMENTO: &str = "PERIODO_FATURAMENTO";
pub const DATA_VENCIMENTO: &str = "DATA_VENCIMENTO";
pub const VALOR_PAGAR: &str = "VALOR_PAGAR";
pub const LEITURA_ATUAL: &str = "LEITURA_ATUAL";
pub const LEITURA_ANTERIOR: &str = "LEITURA_ANTERIOR";
pub const PROXIMA_LEITURA: &str = "PROXIMA_LEITURA";
pub const DIAS_LEITURA: &str = "DIAS_LEITURA";
pub const DADOS_PESSOAIS: &str = "DADOS_PESSOAIS";
pub const RESPONSAVEL_PELA_ILUMINACAO: &str = "RESPONSAVEL_PELA_ILUMINACAO";
pub const INFORMACOES_TRIBUTARIAS: &str = "INFORMACOES_TRIBUTARIAS";
pub const MENSAGEM_IMPORTANTE: &str = "MENSAGEM_IMPORTANTE";

/// Name of the region recognized to detect the layout.
pub const LAYOUT_ANCHOR: &str = "LAYOUT_ANCHOR";

const REGION_TABLE: &[(&str, u32, u32, u32, u32)] = &[
    (CLASSIFICACAO_UNIDADE_CONSUMIDORA, 178, 328, 639, 68),
    (TIPO_FORNECIMENTO, 827, 329, 304, 63),
    (NUMERO_INSTALACAO, 826, 491, 312, 52),
    (NUMERO_CLIENTE, 826, 596, 317, 70),
    (PERIODO_FATURAMENTO, 184, 719, 248, 63),
    (DATA_VENCIMENTO, 431, 713, 299, 71),
    (VALOR_PAGAR, 732, 718, 408, 63),
    (LEITURA_ATUAL, 1599, 325, 230, 74),
    (LEITURA_ANTERIOR, 1312, 324, 284, 76),
    (PROXIMA_LEITURA, 2021, 324, 279, 72),
    (DIAS_LEITURA, 1835, 328, 183, 68),
    (DADOS_PESSOAIS, 165, 404, 659, 264),
    (RESPONSAVEL_PELA_ILUMINACAO, 175, 2733, 967, 81),
    (INFORMACOES_TRIBUTARIAS, 1408, 452, 926, 319),
    (MENSAGEM_IMPORTANTE, 62, 833, 2380, 421),
    (DESCRICAO_FATURAMENTO, 11, 1314, 1452, 962),
    (TRIBUTOS, 1433, 1255, 445, 529),
];

/// Regions cropped for `layout`. Both variants currently share one table.
#[must_use]
pub fn regions(layout: LayoutId) -> Vec<Region> {
    match layout {
        LayoutId::V1 | LayoutId::V2 => REGION_TABLE
            .iter()
            .map(|&(name, x, y, width, height)| Region {
                name,
                x,
                y,
                width,
                height,
            })
            .collect(),
    }
}

/// Region coordinates as written in layout rule files. Values may be floats
/// and are truncated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionBox {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub w: Option<f64>,
    #[serde(default)]
    pub h: Option<f64>,
}

impl RegionBox {
    /// `None` for missing coordinates or a non-positive size.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_region(&self, name: &'static str) -> Option<Region> {
        let x = self.x?.trunc();
        let y = self.y?.trunc();
        let w = self.w?.trunc();
        let h = self.h?.trunc();
        if w <= 0.0 || h <= 0.0 {
            return None;
        }
        Some(Region {
            name,
            x: x.max(0.0) as u32,
            y: y.max(0.0) as u32,
            width: w as u32,
            height: h as u32,
        })
    }
}

impl FromStr for RegionBox {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let parts = spec.split(',').map(str::trim).collect::<Vec<_>>();
        if parts.len() != 4 {
            return Err(format!(
                "invalid region '{spec}', expected exactly 4 values x,y,w,h"
            ));
        }
        let parse = |label: &str, value: &str| {
            value
                .parse::<f64>()
                .map_err(|_| format!("invalid {label} coordinate: '{value}'"))
        };
        let region = Self {
            x: Some(parse("x", parts[0])?),
            y: Some(parse("y", parts[1])?),
            w: Some(parse("w", parts[2])?),
            h: Some(parse("h", parts[3])?),
        };
        if region.to_region(LAYOUT_ANCHOR).is_none() {
            return Err("region requires w>0 and h>0".to_string());
        }
        Ok(region)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutVariant {
    #[serde(default)]
    pub anchors: Vec<String>,
    #[serde(default)]
    pub region: Option<RegionBox>,
}

/// Anchor rules: texts that, when found in the `v1` anchor region, identify
/// the first layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutRules {
    #[serde(default)]
    pub v1: Option<LayoutVariant>,
    #[serde(default)]
    pub v2: Option<LayoutVariant>,
}

impl LayoutRules {
    /// Region to recognize for detection, when the rules make detection
    /// possible at all.
    #[must_use]
    pub fn anchor_region(&self) -> Option<Region> {
        let v1 = self.v1.as_ref()?;
        if v1.anchors.is_empty() {
            return None;
        }
        v1.region.as_ref()?.to_region(LAYOUT_ANCHOR)
    }

    fn anchors(&self) -> Vec<String> {
        self.v1
            .as_ref()
            .map(|variant| {
                variant
                    .anchors
                    .iter()
                    .map(|anchor| normalize_text(anchor, Case::Upper))
                    .filter(|anchor| !anchor.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Picks the layout from the texts recognized in the anchor region.
#[must_use]
pub fn detect_layout(anchor_texts: &[String], rules: &LayoutRules) -> LayoutId {
    let anchors = rules.anchors();
    if anchors.is_empty() || rules.anchor_region().is_none() {
        return LayoutId::V1;
    }

    let haystack = normalize_text(&anchor_texts.join(" "), Case::Upper);
    if anchors.iter().any(|anchor| haystack.contains(anchor.as_str())) {
        return LayoutId::V1;
    }
    if rules.v2.is_some() {
        tracing::debug!("no v1 anchor found, using v2");
        return LayoutId::V2;
    }
    LayoutId::V1
}
