//! Fixed code vocabularies for valve designation fields.
//!
//! These tables are the single source of truth for which codes a rule
//! document may contain and which options the interactive completion UI
//! offers. Structure forms are product-type-dependent; every other
//! vocabulary is global.

use crate::attributes::ProductType;

/// Drive mode codes. The empty code is manual and is omitted from the
/// composed product code.
pub const DRIVE_MODES: &[(&str, &str)] = &[
    ("", "手动（默认）"),
    ("0", "电磁动"),
    ("1", "电磁-液动"),
    ("2", "电-液动"),
    ("3", "蜗轮"),
    ("4", "正齿轮"),
    ("5", "锥齿轮"),
    ("6", "气动"),
    ("6K", "常开式气动"),
    ("6B", "常闭式气动"),
    ("7", "液动"),
    ("7K", "常开式液动"),
    ("7B", "常闭式液动"),
    ("8", "气-液动"),
    ("9", "电动"),
    ("9B", "防爆电动"),
];

pub const CONNECTION_TYPES: &[(&str, &str)] = &[
    ("1", "内螺纹"),
    ("2", "外螺纹"),
    ("4", "法兰式"),
    ("6", "焊接式"),
    ("7", "对夹"),
    ("8", "卡箍/沟槽"),
    ("9", "卡套"),
];

pub const SEALING_MATERIALS: &[(&str, &str)] = &[
    ("B", "锡基轴承合金(巴氏合金)"),
    ("C", "搪瓷"),
    ("D", "渗氮钢"),
    ("F", "氟塑料"),
    ("G", "陶瓷"),
    ("H", "Cr13系不锈钢"),
    ("J", "衬胶"),
    ("M", "蒙乃尔合金"),
    ("N", "尼龙塑料"),
    ("P", "渗硼钢"),
    ("Q", "衬铅"),
    ("R", "奥氏体不锈钢"),
    ("S", "塑料"),
    ("T", "铜合金"),
    ("X", "橡胶"),
    ("Y", "硬质合金"),
    ("W", "阀体直接加工"),
];

pub const BODY_MATERIALS: &[(&str, &str)] = &[
    ("C", "碳钢"),
    ("H", "Cr13系不锈钢"),
    ("I", "铬钼系钢"),
    ("K", "可锻铸铁"),
    ("L", "铝合金"),
    ("P", "铬镍系不锈钢"),
    ("Q", "球墨铸铁"),
    ("R", "铬镍钼系不锈钢"),
    ("S", "塑料"),
    ("T", "铜及铜合金"),
    ("Ti", "钛及钛合金"),
    ("U", "UPVC塑料"),
    ("V", "PP塑料"),
    ("Z", "灰铸铁"),
];

/// Standard pressure classes (10 × MPa).
pub const PRESSURE_CLASSES: &[&str] = &["6", "10", "16", "25", "40"];

/// Structure form options for one product family. Empty for the special
/// families, whose codes carry no structure digit.
pub fn structure_forms(product: ProductType) -> &'static [(&'static str, &'static str)] {
    match product {
        ProductType::Gate => &[
            ("0", "明杆楔式弹性闸板"),
            ("1", "明杆楔式刚性单闸板"),
            ("2", "明杆楔式刚性双闸板"),
            ("3", "明杆平行式单闸板"),
            ("4", "明杆平行式双闸板"),
            ("5", "暗杆楔式单闸板"),
            ("6", "暗杆楔式双闸板"),
            ("7", "暗杆平行式单闸板"),
            ("8", "暗杆平行式双闸板"),
        ],
        ProductType::Butterfly => &[
            ("0", "密封型单偏心"),
            ("1", "密封型中心垂直板"),
            ("2", "密封型双偏心"),
            ("3", "密封型三偏心"),
            ("4", "密封型连杆机构"),
            ("5", "非密封型单偏心"),
            ("6", "非密封型中心垂直板"),
            ("7", "非密封型双偏心"),
            ("8", "非密封型三偏心"),
            ("9", "非密封型连杆机构"),
        ],
        ProductType::Ball => &[
            ("0", "固定球半球直通"),
            ("1", "浮动球直通流道"),
            ("2", "浮动球Y形三通流道"),
            ("4", "浮动球L形三通流道"),
            ("5", "浮动球T形三通流道"),
            ("6", "固定球四通流道"),
            ("7", "固定球直通流道"),
            ("8", "固定球T形三通流道"),
            ("9", "固定球L形三通流道"),
        ],
        ProductType::Check => &[
            ("1", "升降式阀瓣直通流道"),
            ("2", "升降式阀瓣立式结构"),
            ("3", "升降式阀瓣角式流道"),
            ("4", "旋启式阀瓣单瓣结构"),
            ("5", "旋启式阀瓣多瓣结构"),
            ("6", "旋启式阀瓣双瓣结构"),
            ("7", "蝶形止回式"),
        ],
        ProductType::Globe | ProductType::Throttle | ProductType::Plunger => &[
            ("1", "阀瓣非平衡式直通流道"),
            ("2", "阀瓣非平衡式Z形流道"),
            ("3", "阀瓣非平衡式三通流道"),
            ("4", "阀瓣非平衡式角式流道"),
            ("5", "阀瓣非平衡式直流流道"),
            ("6", "阀瓣平衡式直通流道"),
            ("7", "阀瓣平衡式角式流道"),
        ],
        ProductType::Diaphragm => &[
            ("1", "屋脊流道"),
            ("5", "直流流道"),
            ("6", "直通流道"),
            ("8", "Y形角式流道"),
        ],
        ProductType::Safety => &[
            ("0", "带散热片全启式"),
            ("1", "弹簧载荷密封微启式"),
            ("2", "弹簧载荷密封全启式"),
            ("3", "弹簧载荷带扳手微启式双联阀"),
            ("4", "弹簧载荷密封带扳手全启式"),
            ("6", "带控制机构全启式"),
            ("7", "弹簧载荷不封闭带扳手微启式"),
            ("8", "弹簧载荷不封闭带扳手全启式"),
            ("9", "脉冲式"),
        ],
        ProductType::LeverSafety => &[("2", "单杠杆"), ("4", "双杠杆")],
        ProductType::PressureReducing => &[
            ("1", "薄膜式"),
            ("2", "弹簧薄膜式"),
            ("3", "活塞式"),
            ("4", "波纹管式"),
            ("5", "杠杆式"),
        ],
        ProductType::SteamTrap => &[
            ("1", "浮球式"),
            ("3", "浮桶式"),
            ("4", "液体或固体膨胀式"),
            ("5", "钟形浮子式"),
            ("6", "蒸汽压力式或膜盒式"),
            ("7", "双金属片式"),
            ("8", "脉冲式"),
            ("9", "圆盘热动力式"),
        ],
        ProductType::Vent => &[
            ("1", "液面连接排放截止型直通式"),
            ("2", "液面连接排放截止型角式"),
            ("5", "液底间断排放截止型直流式"),
            ("6", "液底间断排放截止型直通式"),
            ("7", "液底间断排放截止型角式"),
            ("8", "液底间断排放浮动闸板型直通式"),
        ],
        ProductType::Plug => &[
            ("3", "填料密封直通流道"),
            ("4", "填料密封T形三通流道"),
            ("5", "填料密封四通流道"),
            ("7", "油密封直通流道"),
            ("8", "油密封T形三通流道"),
        ],
        _ => &[],
    }
}

fn in_table(table: &[(&str, &str)], code: &str) -> bool {
    table.iter().any(|(c, _)| *c == code)
}

/// Valid drive mode code (the empty manual code included).
pub fn is_valid_drive_mode(code: &str) -> bool {
    in_table(DRIVE_MODES, code)
}

/// Valid connection code, or empty (unset).
pub fn is_valid_connection(code: &str) -> bool {
    code.is_empty() || in_table(CONNECTION_TYPES, code)
}

/// Valid sealing code, or empty (unset).
pub fn is_valid_sealing(code: &str) -> bool {
    code.is_empty() || in_table(SEALING_MATERIALS, code)
}

/// Valid body material code, or empty (unset).
pub fn is_valid_material(code: &str) -> bool {
    code.is_empty() || in_table(BODY_MATERIALS, code)
}

/// Valid structure code for the given family. Families without a structure
/// table accept any single digit, since their documents may still carry one.
pub fn is_valid_structure(product: ProductType, code: &str) -> bool {
    if code.is_empty() {
        return true;
    }
    let table = structure_forms(product);
    if table.is_empty() {
        code.len() == 1 && code.chars().all(|c| c.is_ascii_digit())
    } else {
        in_table(table, code)
    }
}

/// Pressure strings are positive integer digit strings; the standard
/// classes are preferred but custom ratings (e.g. "63") are accepted.
pub fn is_valid_pressure(code: &str) -> bool {
    code.is_empty()
        || (code.chars().all(|c| c.is_ascii_digit()) && code.parse::<u32>().is_ok_and(|v| v > 0))
}

/// Option sets for the interactive completion UI, with structure options
/// narrowed to the product family.
pub struct FieldOptions {
    pub drive_modes: &'static [(&'static str, &'static str)],
    pub connection_types: &'static [(&'static str, &'static str)],
    pub structure_forms: &'static [(&'static str, &'static str)],
    pub sealing_materials: &'static [(&'static str, &'static str)],
    pub body_materials: &'static [(&'static str, &'static str)],
    pub pressure_classes: &'static [&'static str],
}

pub fn interactive_options(product: ProductType) -> FieldOptions {
    FieldOptions {
        drive_modes: DRIVE_MODES,
        connection_types: CONNECTION_TYPES,
        structure_forms: structure_forms(product),
        sealing_materials: SEALING_MATERIALS,
        body_materials: BODY_MATERIALS,
        pressure_classes: PRESSURE_CLASSES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_drive_is_valid() {
        assert!(is_valid_drive_mode(""));
        assert!(is_valid_drive_mode("9B"));
        assert!(!is_valid_drive_mode("Z"));
    }

    #[test]
    fn connection_codes() {
        assert!(is_valid_connection("4"));
        assert!(is_valid_connection(""));
        assert!(!is_valid_connection("3"));
    }

    #[test]
    fn structure_depends_on_family() {
        // 4 = 旋启式 exists for check valves but not for lever safety valves.
        assert!(is_valid_structure(ProductType::Check, "4"));
        assert!(is_valid_structure(ProductType::LeverSafety, "4"));
        assert!(!is_valid_structure(ProductType::LeverSafety, "5"));
        // Special families carry no structure table; any digit passes.
        assert!(is_valid_structure(ProductType::RemoteFloat, "1"));
        assert!(!is_valid_structure(ProductType::RemoteFloat, "XY"));
    }

    #[test]
    fn pressure_strings() {
        assert!(is_valid_pressure("16"));
        assert!(is_valid_pressure("63"));
        assert!(is_valid_pressure(""));
        assert!(!is_valid_pressure("0"));
        assert!(!is_valid_pressure("1.6"));
    }

    #[test]
    fn options_narrow_structure_forms() {
        let opts = interactive_options(ProductType::Diaphragm);
        assert_eq!(opts.structure_forms.len(), 4);
        let opts = interactive_options(ProductType::AdjustableReducing);
        assert!(opts.structure_forms.is_empty());
        assert_eq!(opts.pressure_classes, PRESSURE_CLASSES);
    }
}
