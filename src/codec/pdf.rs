//! # PDF 文档构建
//!
//! 基于 `lopdf` 的最小 PDF 构建器：创建文档、添加页面、嵌入光栅图像、
//! 在页面上绘制图像并序列化。
//!
//! ## 功能
//! - 页面尺寸以 PDF point 为单位
//! - 图像以 FlateDecode 无损压缩嵌入（DeviceRGB, 8 bpc）
//! - 带 alpha 的图像附加 DeviceGray SMask
//!
//! ## 依赖关系
//! - 被 `converter.rs` 使用
//! - 使用 `codec/raster.rs` 的 `RasterImage`

use crate::codec::raster::RasterImage;
use crate::error::{ConverterError, Result};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// 页面句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRef(usize);

/// 已嵌入图像的句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRef(ObjectId);

/// 尚未写入文档的页面
struct PendingPage {
    width: f32,
    height: f32,
    operations: Vec<Operation>,
    xobjects: Dictionary,
}

/// PDF 构建器
pub struct PdfBuilder {
    doc: Document,
    pages: Vec<PendingPage>,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBuilder {
    /// 创建空文档
    pub fn new() -> Self {
        Self {
            doc: Document::with_version("1.5"),
            pages: Vec::new(),
        }
    }

    /// 添加页面，尺寸单位为 point
    pub fn add_page(&mut self, width: f32, height: f32) -> PageRef {
        self.pages.push(PendingPage {
            width,
            height,
            operations: Vec::new(),
            xobjects: Dictionary::new(),
        });
        PageRef(self.pages.len() - 1)
    }

    /// 无损嵌入光栅图像
    pub fn embed_raster(&mut self, image: &RasterImage) -> Result<ImageRef> {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width as i64,
            "Height" => image.height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
        };

        if image.has_alpha() {
            let mut smask = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => image.width as i64,
                    "Height" => image.height as i64,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8_i64,
                },
                image.alpha8(),
            );
            smask.compress().map_err(pdf_error)?;
            let smask_id = self.doc.add_object(smask);
            dict.set("SMask", Object::Reference(smask_id));
        }

        let mut stream = Stream::new(dict, image.rgb8());
        stream.compress().map_err(pdf_error)?;
        Ok(ImageRef(self.doc.add_object(stream)))
    }

    /// 在页面 (x, y) 处以给定宽高绘制图像
    pub fn draw_image(
        &mut self,
        page: PageRef,
        image: ImageRef,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<()> {
        let pending = self
            .pages
            .get_mut(page.0)
            .ok_or_else(|| ConverterError::EncodeFailure(format!("unknown page {}", page.0)))?;

        let name = format!("Im{}", pending.xobjects.len());
        pending
            .xobjects
            .set(name.as_bytes().to_vec(), Object::Reference(image.0));

        pending.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width.into(),
                    Object::Integer(0),
                    Object::Integer(0),
                    height.into(),
                    x.into(),
                    y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);

        Ok(())
    }

    /// 序列化为 PDF 字节
    pub fn serialize(mut self) -> Result<Vec<u8>> {
        let pages_id = self.doc.new_object_id();
        let mut kids = Vec::with_capacity(self.pages.len());

        for pending in std::mem::take(&mut self.pages) {
            let content = Content {
                operations: pending.operations,
            };
            let content_id = self
                .doc
                .add_object(Stream::new(Dictionary::new(), content.encode().map_err(pdf_error)?));

            let media_box: Vec<Object> = vec![
                Object::Integer(0),
                Object::Integer(0),
                pending.width.into(),
                pending.height.into(),
            ];
            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "XObject" => pending.xobjects,
                },
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        self.doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes).map_err(pdf_error)?;
        Ok(bytes)
    }
}

fn pdf_error(e: impl std::fmt::Display) -> ConverterError {
    ConverterError::EncodeFailure(format!("pdf: {}", e))
}
