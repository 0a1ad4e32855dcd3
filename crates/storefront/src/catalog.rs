//! Static product recommendation catalog.
//!
//! The recommendation page groups products by routine step. The catalog is
//! compiled in rather than stored remotely: it changes with releases, not
//! with user actions, and pricing on these cards is display copy - the
//! amount that matters for payment is snapshotted at checkout time.

use serde::Serialize;

/// One routine step and its recommended products.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSection {
    /// URL slug, e.g. `cleanser`
    pub category: &'static str,
    /// Display title, e.g. `클렌저`
    pub title: &'static str,
    pub products: &'static [Product],
}

/// A recommended product card.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub name: &'static str,
    pub image: &'static str,
    /// Display price, e.g. `"21,000원"`
    pub price: &'static str,
    pub volume: &'static str,
}

/// The full catalog, in routine order.
pub const CATALOG: &[CatalogSection] = &[
    CatalogSection {
        category: "cleanser",
        title: "클렌저",
        products: &[
            Product {
                name: "약산성 폼 클렌저",
                image: "https://image.oliveyoung.co.kr/cfimages/cf-goods/uploads/images/thumbnails/550/10/0000/0014/A00000014840816ko.jpg",
                price: "21,000원",
                volume: "250ml",
            },
            Product {
                name: "저자극 젤 클렌저",
                image: "https://image.oliveyoung.co.kr/cfimages/cf-goods/uploads/images/thumbnails/550/10/0000/0018/A00000018496714ko.jpg",
                price: "19,200원",
                volume: "200ml",
            },
            Product {
                name: "클렌징 밤",
                image: "https://image.oliveyoung.co.kr/cfimages/cf-goods/uploads/images/thumbnails/550/10/0000/0020/A00000020247241ko.jpg",
                price: "19,900원",
                volume: "90ml",
            },
            Product {
                name: "오일 클렌저",
                image: "https://image.oliveyoung.co.kr/cfimages/cf-goods/uploads/images/thumbnails/550/10/0000/0018/A00000018637710ko.jpg",
                price: "46,000원",
                volume: "275ml",
            },
        ],
    },
    CatalogSection {
        category: "toner",
        title: "토너",
        products: &[
            Product {
                name: "수분 밸런싱 토너",
                image: "https://image.oliveyoung.co.kr/cfimages/cf-goods/uploads/images/thumbnails/550/10/0000/0021/A00000021279202ko.jpg",
                price: "19,900원",
                volume: "150ml",
            },
            Product {
                name: "AHA 각질 토너",
                image: "https://images.unsplash.com/photo-1616394584738-fc6e612e71b9?w=1080&q=80",
                price: "30,000원",
                volume: "150ml",
            },
            Product {
                name: "저자극 진정 토너",
                image: "https://images.unsplash.com/photo-1570194065650-d99fb4bedf0a?w=1080&q=80",
                price: "28,000원",
                volume: "200ml",
            },
            Product {
                name: "BHA 수렴 토너",
                image: "https://images.unsplash.com/photo-1750085036912-b4bff0ddcd77?w=1080&q=80",
                price: "32,000원",
                volume: "150ml",
            },
        ],
    },
    CatalogSection {
        category: "serum",
        title: "세럼",
        products: &[
            Product {
                name: "히알루론산 수분 세럼",
                image: "https://images.unsplash.com/photo-1685137562352-5db6e7495538?w=1080&q=80",
                price: "35,000원",
                volume: "50ml",
            },
            Product {
                name: "니아신아마이드 균일 세럼",
                image: "https://images.unsplash.com/photo-1608326389514-d9d2514e1933?w=1080&q=80",
                price: "40,000원",
                volume: "30ml",
            },
            Product {
                name: "비타민C 브라이트닝 세럼",
                image: "https://images.unsplash.com/photo-1648139347040-857f024f8da4?w=1080&q=80",
                price: "45,000원",
                volume: "30ml",
            },
            Product {
                name: "펩타이드 리프팅 세럼",
                image: "https://images.unsplash.com/photo-1618120508902-c8d05e7985ee?w=1080&q=80",
                price: "55,000원",
                volume: "30ml",
            },
        ],
    },
    CatalogSection {
        category: "cream",
        title: "크림",
        products: &[
            Product {
                name: "세라마이드 장벽 크림",
                image: "https://images.unsplash.com/photo-1728994062543-74a1dc2c9392?w=1080&q=80",
                price: "38,000원",
                volume: "50ml",
            },
            Product {
                name: "라이트 젤 크림",
                image: "https://images.unsplash.com/photo-1696881694567-cd1a97958fc8?w=1080&q=80",
                price: "32,000원",
                volume: "50ml",
            },
            Product {
                name: "리치 밤 크림",
                image: "https://images.unsplash.com/photo-1605204768985-81bad5fd9d79?w=1080&q=80",
                price: "42,000원",
                volume: "50ml",
            },
            Product {
                name: "수분 크림",
                image: "https://images.unsplash.com/photo-1638609927040-8a7e97cd9d6a?w=1080&q=80",
                price: "28,000원",
                volume: "50ml",
            },
        ],
    },
    CatalogSection {
        category: "sunscreen",
        title: "선크림",
        products: &[
            Product {
                name: "논나노 무기자차",
                image: "https://images.unsplash.com/photo-1681916815996-9fdc49fe489a?w=1080&q=80",
                price: "25,000원",
                volume: "50ml",
            },
            Product {
                name: "워터프루프 유기자차",
                image: "https://images.unsplash.com/photo-1600110116536-7a98859a927c?w=1080&q=80",
                price: "28,000원",
                volume: "50ml",
            },
            Product {
                name: "톤업 선크림",
                image: "https://images.unsplash.com/photo-1543364148-c43c4e908f47?w=1080&q=80",
                price: "30,000원",
                volume: "50ml",
            },
            Product {
                name: "민감성 피부용 선크림",
                image: "https://images.unsplash.com/photo-1751821195194-0bbc1caab446?w=1080&q=80",
                price: "32,000원",
                volume: "50ml",
            },
        ],
    },
];

/// Find a catalog section by its slug.
#[must_use]
pub fn section(category: &str) -> Option<&'static CatalogSection> {
    CATALOG.iter().find(|s| s.category == category)
}
