// Copyright 2026 Saucesort Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::Serialize;

/// Database indices accepted by the search endpoint's `db` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Database {
    HMagazines,
    HGameCg,
    DoujinshiDb,
    PixivImages,
    NicoNicoSeiga,
    Danbooru,
    DrawrImages,
    NijieImages,
    YandeRe,
    Shutterstock,
    Fakku,
    HMisc,
    TwoDMarket,
    MediBang,
    Anime,
    HAnime,
    Movies,
    Shows,
    Gelbooru,
    Konachan,
    SankakuChannel,
    AnimePicturesNet,
    E621Net,
    IdolComplex,
    BcyNetIllust,
    BcyNetCosplay,
    PortalGraphicsNet,
    DeviantArt,
    PawooNet,
    MadokamiManga,
    MangaDex,
    All,
}

pub const ALL_CODE: u32 = 999;

impl Database {
    pub const KNOWN: [Database; 32] = [
        Database::HMagazines,
        Database::HGameCg,
        Database::DoujinshiDb,
        Database::PixivImages,
        Database::NicoNicoSeiga,
        Database::Danbooru,
        Database::DrawrImages,
        Database::NijieImages,
        Database::YandeRe,
        Database::Shutterstock,
        Database::Fakku,
        Database::HMisc,
        Database::TwoDMarket,
        Database::MediBang,
        Database::Anime,
        Database::HAnime,
        Database::Movies,
        Database::Shows,
        Database::Gelbooru,
        Database::Konachan,
        Database::SankakuChannel,
        Database::AnimePicturesNet,
        Database::E621Net,
        Database::IdolComplex,
        Database::BcyNetIllust,
        Database::BcyNetCosplay,
        Database::PortalGraphicsNet,
        Database::DeviantArt,
        Database::PawooNet,
        Database::MadokamiManga,
        Database::MangaDex,
        Database::All,
    ];

    pub fn code(self) -> u32 {
        match self {
            Database::HMagazines => 0,
            Database::HGameCg => 2,
            Database::DoujinshiDb => 3,
            Database::PixivImages => 5,
            Database::NicoNicoSeiga => 8,
            Database::Danbooru => 9,
            Database::DrawrImages => 10,
            Database::NijieImages => 11,
            Database::YandeRe => 12,
            Database::Shutterstock => 15,
            Database::Fakku => 16,
            Database::HMisc => 18,
            Database::TwoDMarket => 19,
            Database::MediBang => 20,
            Database::Anime => 21,
            Database::HAnime => 22,
            Database::Movies => 23,
            Database::Shows => 24,
            Database::Gelbooru => 25,
            Database::Konachan => 26,
            Database::SankakuChannel => 27,
            Database::AnimePicturesNet => 28,
            Database::E621Net => 29,
            Database::IdolComplex => 30,
            Database::BcyNetIllust => 31,
            Database::BcyNetCosplay => 32,
            Database::PortalGraphicsNet => 33,
            Database::DeviantArt => 34,
            Database::PawooNet => 35,
            Database::MadokamiManga => 36,
            Database::MangaDex => 37,
            Database::All => ALL_CODE,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::KNOWN.iter().copied().find(|db| db.code() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            Database::HMagazines => "H-Magazines",
            Database::HGameCg => "H-Game CG",
            Database::DoujinshiDb => "DoujinshiDB",
            Database::PixivImages => "Pixiv Images",
            Database::NicoNicoSeiga => "Nico Nico Seiga",
            Database::Danbooru => "Danbooru",
            Database::DrawrImages => "drawr Images",
            Database::NijieImages => "Nijie Images",
            Database::YandeRe => "Yande.re",
            Database::Shutterstock => "Shutterstock",
            Database::Fakku => "FAKKU",
            Database::HMisc => "H-Misc",
            Database::TwoDMarket => "2D-Market",
            Database::MediBang => "MediBang",
            Database::Anime => "Anime",
            Database::HAnime => "H-Anime",
            Database::Movies => "Movies",
            Database::Shows => "Shows",
            Database::Gelbooru => "Gelbooru",
            Database::Konachan => "Konachan",
            Database::SankakuChannel => "Sankaku Channel",
            Database::AnimePicturesNet => "Anime-Pictures.net",
            Database::E621Net => "e621.net",
            Database::IdolComplex => "Idol Complex",
            Database::BcyNetIllust => "bcy.net Illust",
            Database::BcyNetCosplay => "bcy.net Cosplay",
            Database::PortalGraphicsNet => "PortalGraphics.net",
            Database::DeviantArt => "deviantArt",
            Database::PawooNet => "Pawoo.net",
            Database::MadokamiManga => "Madokami (Manga)",
            Database::MangaDex => "MangaDex",
            Database::All => "All",
        }
    }

    /// Indices the upstream service only partially covers.
    pub fn is_uncompleted(self) -> bool {
        matches!(
            self,
            Database::HMagazines
                | Database::HGameCg
                | Database::DoujinshiDb
                | Database::Shutterstock
                | Database::Movies
                | Database::Shows
                | Database::SankakuChannel
                | Database::IdolComplex
                | Database::BcyNetIllust
                | Database::BcyNetCosplay
                | Database::DeviantArt
                | Database::PawooNet
                | Database::MangaDex
        )
    }
}

pub fn is_uncompleted_code(code: u32) -> bool {
    Database::from_code(code).is_some_and(Database::is_uncompleted)
}
