/// Full-width ascii sits at a fixed offset above its half-width form.
const FULL_WIDTH_OFFSET: u32 = 0xFEE0;

/// Katakana sits at a fixed offset above the matching hiragana.
const KATAKANA_OFFSET: u32 = 0x60;

/// Fold one raw input fragment to the lowercase ascii the matcher compares
/// against. Full-width letters from an IME left in zenkaku mode, committed
/// kana and mixed case all arrive here.
///
/// Steps run in order: full-width → half-width, kana → romaji, lowercase.
/// Characters with no mapping pass through untouched.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars().map(to_half_width) {
        match kana_romaji(c) {
            Some(romaji) => out.push_str(romaji),
            None => out.push(c),
        }
    }
    out.to_lowercase()
}

/// True if the raw fragment still holds kana or ideographs, i.e. the input
/// method has not committed ascii yet.
pub fn is_composition_active(raw: &str) -> bool {
    raw.chars().any(|c| {
        matches!(c,
            'ぁ'..='ん'
            | 'ァ'..='ン'
            | '一'..='龠')
    })
}

fn to_half_width(c: char) -> char {
    match c {
        'Ａ'..='Ｚ' | 'ａ'..='ｚ' | '０'..='９' => {
            char::from_u32(c as u32 - FULL_WIDTH_OFFSET).unwrap_or(c)
        }
        _ => c,
    }
}

fn to_hiragana(c: char) -> char {
    match c {
        'ァ'..='ヶ' => char::from_u32(c as u32 - KATAKANA_OFFSET).unwrap_or(c),
        _ => c,
    }
}

fn kana_romaji(c: char) -> Option<&'static str> {
    let romaji = match to_hiragana(c) {
        'あ' => "a",
        'い' => "i",
        'う' => "u",
        'え' => "e",
        'お' => "o",
        'か' => "ka",
        'き' => "ki",
        'く' => "ku",
        'け' => "ke",
        'こ' => "ko",
        'さ' => "sa",
        'し' => "shi",
        'す' => "su",
        'せ' => "se",
        'そ' => "so",
        'た' => "ta",
        'ち' => "chi",
        'つ' => "tsu",
        'て' => "te",
        'と' => "to",
        'な' => "na",
        'に' => "ni",
        'ぬ' => "nu",
        'ね' => "ne",
        'の' => "no",
        'は' => "ha",
        'ひ' => "hi",
        'ふ' => "fu",
        'へ' => "he",
        'ほ' => "ho",
        'ま' => "ma",
        'み' => "mi",
        'む' => "mu",
        'め' => "me",
        'も' => "mo",
        'や' => "ya",
        'ゆ' => "yu",
        'よ' => "yo",
        'ら' => "ra",
        'り' => "ri",
        'る' => "ru",
        'れ' => "re",
        'ろ' => "ro",
        'わ' => "wa",
        'ゐ' => "wi",
        'ゑ' => "we",
        'を' => "wo",
        'ん' => "n",
        'が' => "ga",
        'ぎ' => "gi",
        'ぐ' => "gu",
        'げ' => "ge",
        'ご' => "go",
        'ざ' => "za",
        'じ' => "ji",
        'ず' => "zu",
        'ぜ' => "ze",
        'ぞ' => "zo",
        'だ' => "da",
        'ぢ' => "di",
        'づ' => "du",
        'で' => "de",
        'ど' => "do",
        'ば' => "ba",
        'び' => "bi",
        'ぶ' => "bu",
        'べ' => "be",
        'ぼ' => "bo",
        'ぱ' => "pa",
        'ぴ' => "pi",
        'ぷ' => "pu",
        'ぺ' => "pe",
        'ぽ' => "po",
        'ゔ' => "vu",
        'ぁ' => "xa",
        'ぃ' => "xi",
        'ぅ' => "xu",
        'ぇ' => "xe",
        'ぉ' => "xo",
        'ゃ' => "xya",
        'ゅ' => "xyu",
        'ょ' => "xyo",
        'っ' => "xtu",
        'ゎ' => "xwa",
        'ー' => "-",
        _ => return None,
    };
    Some(romaji)
}
