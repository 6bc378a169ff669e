// utils/geography.rs
//! Administrative geography of Mauritania: the 15 wilayas and their
//! moughataas, with reference coordinates for map markers.
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct Moughataa {
    pub name: &'static str,
    pub latin: &'static str,
    pub center: GeoPoint,
}

#[derive(Debug, Serialize)]
pub struct Wilaya {
    pub name: &'static str,
    pub center: GeoPoint,
    pub moughataas: &'static [Moughataa],
}

const fn pt(lat: f64, lng: f64) -> GeoPoint {
    GeoPoint { lat, lng }
}

const fn m(name: &'static str, latin: &'static str, lat: f64, lng: f64) -> Moughataa {
    Moughataa { name, latin, center: pt(lat, lng) }
}

pub static WILAYAS: &[Wilaya] = &[
    Wilaya {
        name: "الحوض الشرقي",
        center: pt(16.6, -7.1),
        moughataas: &[
            m("النعمة", "Nema", 16.616, -7.256),
            m("تمبدغة", "Timbedra", 16.508, -8.167),
            m("أمرج", "Amourj", 16.083, -6.267),
            m("باسكنو", "Bassiknou", 15.95, -5.767),
            m("جكني", "Djigueni", 16.267, -5.85),
            m("ولاتة", "Oualata", 17.3, -7.033),
        ],
    },
    Wilaya {
        name: "الحوض الغربي",
        center: pt(15.9, -9.4),
        moughataas: &[
            m("لعيون", "Aioun El Atrouss", 15.35, -9.833),
            m("كوبني", "Kobenni", 15.233, -9.433),
            m("تامشكط", "Tamchakett", 17.233, -10.667),
            m("الطينطان", "Tintane", 16.133, -10.2),
        ],
    },
    Wilaya {
        name: "لعصابة",
        center: pt(16.1, -11.4),
        moughataas: &[
            m("كيفه", "Kiffa", 16.15, -11.4),
            m("باركيول", "Barkeol", 15.233, -12.633),
            m("بومديد", "Boumdeid", 17.033, -11.8),
            m("كرو", "Guerou", 16.617, -12.383),
            m("كنكوصة", "Kankossa", 15.533, -12.283),
        ],
    },
    Wilaya {
        name: "كوركول",
        center: pt(16.1, -13.1),
        moughataas: &[
            m("كيهيدي", "Kaedi", 16.15, -13.467),
            m("امبود", "M'Bout", 16.733, -12.733),
            m("مقامة", "Maghama", 15.783, -12.783),
            m("مونكل", "Monguel", 16.517, -13.217),
        ],
    },
    Wilaya {
        name: "لبراكنة",
        center: pt(17.2, -14.5),
        moughataas: &[
            m("ألاك", "Aleg", 17.267, -13.917),
            m("بابابى", "Bababé", 16.467, -14.467),
            m("بوكى", "Boghé", 16.55, -14.083),
            m("امباي", "M'Bagne", 17.0, -14.3),
            m("مقطع لحجار", "Magta Lahjar", 17.583, -15.017),
        ],
    },
    Wilaya {
        name: "الترارزة",
        center: pt(17.7, -15.6),
        moughataas: &[
            m("روصو", "Rosso", 16.517, -15.8),
            m("بوتلميت", "Boutilimit", 17.617, -14.7),
            m("كرمسين", "Keur Macène", 17.417, -15.133),
            m("المذرذرة", "Mederdra", 17.783, -15.883),
            m("اركيز", "R'Kiz", 17.883, -15.617),
            m("واد الناقة", "Ouad Naga", 17.733, -15.45),
        ],
    },
    Wilaya {
        name: "آدرار",
        center: pt(20.0, -13.0),
        moughataas: &[
            m("أطار", "Atar", 20.517, -13.05),
            m("أوجفت", "Aoujeft", 19.817, -13.4),
            m("شنقيط", "Chinguetti", 20.467, -12.35),
            m("وادان", "Ouadane", 20.933, -11.617),
        ],
    },
    Wilaya {
        name: "داخلت نواذيبو",
        center: pt(20.9, -17.0),
        moughataas: &[
            m("نواذيبو", "Nouadhibou", 20.933, -17.033),
            m("الشامي", "Chami", 19.833, -16.05),
        ],
    },
    Wilaya {
        name: "تكانت",
        center: pt(18.5, -11.4),
        moughataas: &[
            m("تجكجة", "Tidjikja", 18.55, -11.417),
            m("المجرية", "Moudjeria", 17.983, -12.15),
            m("تيشيت", "Tichit", 18.45, -9.5),
        ],
    },
    Wilaya {
        name: "كيدي ماغا",
        center: pt(15.2, -12.2),
        moughataas: &[
            m("سيلبابي", "Selibaby", 15.167, -12.183),
            m("ولد ينجه", "Ould Yenge", 15.3, -12.667),
            m("غابو", "Ghabou", 14.3, -12.6),
        ],
    },
    Wilaya {
        name: "تيرس زمور",
        center: pt(22.7, -12.3),
        moughataas: &[
            m("ازويرات", "Zouerate", 22.733, -12.483),
            m("افديرك", "F'Derick", 22.667, -12.733),
            m("بير أم كرين", "Bir Moghrein", 25.233, -11.567),
        ],
    },
    Wilaya {
        name: "إينشيري",
        center: pt(19.8, -14.4),
        moughataas: &[
            m("أكجوجت", "Akjoujt", 19.767, -14.383),
            m("بنشاب", "Bénichab", 19.567, -14.567),
        ],
    },
    Wilaya {
        name: "نواكشوط الغربية",
        center: pt(18.1, -15.97),
        moughataas: &[
            m("تفرغ زينة", "Tevragh Zeina", 18.12, -15.98),
            m("لكصر", "Ksar", 18.08, -15.97),
            m("السبخة", "Sebkha", 18.06, -15.95),
        ],
    },
    Wilaya {
        name: "نواكشوط الشمالية",
        center: pt(18.15, -15.93),
        moughataas: &[
            m("تيارت", "Teyarett", 18.17, -15.92),
            m("دار النعيم", "Dar Naim", 18.14, -15.95),
            m("توجونين", "Toujounine", 18.16, -15.9),
        ],
    },
    Wilaya {
        name: "نواكشوط الجنوبية",
        center: pt(18.03, -15.95),
        moughataas: &[
            m("عرفات", "Arafat", 18.03, -15.93),
            m("الميناء", "El Mina", 18.05, -15.96),
            m("الرياض", "Riyad", 18.02, -15.97),
        ],
    },
];

pub fn find_wilaya(name: &str) -> Option<&'static Wilaya> {
    WILAYAS.iter().find(|w| w.name == name.trim())
}

pub fn moughataas_of(wilaya: &str) -> Option<Vec<&'static str>> {
    find_wilaya(wilaya).map(|w| w.moughataas.iter().map(|m| m.name).collect())
}

pub fn is_valid_location(wilaya: &str, moughataa: &str) -> bool {
    find_wilaya(wilaya)
        .map(|w| w.moughataas.iter().any(|m| m.name == moughataa.trim()))
        .unwrap_or(false)
}

/// Moughataa coordinates, falling back to the wilaya centre when the district is unknown.
pub fn coordinates_for(wilaya: &str, moughataa: &str) -> Option<GeoPoint> {
    let w = find_wilaya(wilaya)?;
    let point = w
        .moughataas
        .iter()
        .find(|m| m.name == moughataa.trim())
        .map(|m| m.center)
        .unwrap_or(w.center);
    Some(point)
}
